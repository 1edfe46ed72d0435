#![no_main]
use libfuzzer_sys::fuzz_target;
use myenovos::portal::auth::extract_access_token;
use reqwest::Url;

fuzz_target!(|data: &[u8]| {
    // Each line is one redirect Location relative to the login endpoint
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(base) = Url::parse("https://auth-customer.enovos.lu/login") else {
        return;
    };
    let history: Vec<Url> = text.lines().filter_map(|l| base.join(l).ok()).collect();

    if let Ok(token) = extract_access_token(&history) {
        assert!(!token.is_empty());
    }
});
