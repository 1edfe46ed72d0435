//! Login handshake against the my.enovos.lu identity provider
//!
//! The provider never returns the access token in a response body. A
//! successful `POST /login` answers with a redirect chain, and the last hop
//! carrying a URL fragment holds `access_token=<token>` in that fragment.
//! Every hop is recorded so the token can be read from the redirect history
//! rather than from the final response.

use crate::error::{EnovosError, Result};
use crate::logging::get_logger;
use crate::portal::endpoints::PortalEndpoints;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Method};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;

/// Upper bound on followed redirects during login
pub const MAX_REDIRECTS: usize = 10;

/// my.enovos.lu username and password
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Result<Self> {
        let username = username.into();
        let password = password.into();
        if username.trim().is_empty() {
            return Err(EnovosError::validation(
                "credentials.username",
                "Username cannot be empty",
            ));
        }
        if password.is_empty() {
            return Err(EnovosError::validation(
                "credentials.password",
                "Password cannot be empty",
            ));
        }
        Ok(Self { username, password })
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// HTTP session: transport (with its cookie jar) plus default headers
pub struct Session {
    transport: Arc<dyn HttpTransport>,
    headers: Vec<(String, String)>,
}

impl Session {
    pub fn new(transport: Arc<dyn HttpTransport>, user_agent: &str) -> Self {
        Self {
            transport,
            headers: vec![("User-Agent".to_string(), user_agent.to_string())],
        }
    }

    /// Set a default header, replacing any previous value
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value));
    }

    /// Send one request carrying the session's default headers
    pub fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
        extra_headers: &[(&str, &str)],
    ) -> Result<HttpResponse> {
        let mut request = HttpRequest::new(method, url);
        request.headers = self.headers.clone();
        request.headers.extend(
            extra_headers
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string())),
        );
        request.body = body;
        self.transport.execute(&request)
    }
}

/// Session carrying a bearer token; created once per process
pub struct AuthenticatedContext {
    session: Session,
    token: String,
}

impl AuthenticatedContext {
    pub fn token(&self) -> &str {
        &self.token
    }

    /// GET a JSON document; non-2xx and unparsable bodies are upstream errors
    pub fn get_json<T: DeserializeOwned>(&self, url: Url, endpoint: &str) -> Result<T> {
        let resp = self
            .session
            .send(Method::Get, url, None, &[("Accept", "application/json")])?;
        if !resp.is_success() {
            return Err(EnovosError::upstream(
                endpoint,
                format!("HTTP {}: {}", resp.status, truncate(&resp.body, 200)),
            ));
        }
        serde_json::from_str(&resp.body).map_err(|e| {
            EnovosError::upstream(endpoint, format!("unexpected response body: {}", e))
        })
    }
}

impl fmt::Debug for AuthenticatedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedContext")
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Log in and return a session authorized with the extracted bearer token
pub fn authenticate(
    transport: Arc<dyn HttpTransport>,
    endpoints: &PortalEndpoints,
    user_agent: &str,
    credentials: &Credentials,
) -> Result<AuthenticatedContext> {
    let logger = get_logger("auth");
    let mut session = Session::new(transport, user_agent);

    let body = serde_json::to_vec(&serde_json::json!({
        "username": credentials.username,
        "password": credentials.password,
    }))?;

    logger.debug(&format!("Logging in as {}", credentials.username));
    let history = follow_login_redirects(&session, endpoints.login()?, body)?;
    let token = extract_access_token(&history)?;

    session.set_header("Authorization", format!("Bearer {}", token));
    logger.info(&format!(
        "Authenticated as {} after {} redirect(s)",
        credentials.username,
        history.len()
    ));

    Ok(AuthenticatedContext { session, token })
}

/// Walk the login redirect chain, returning every hop's resolved `Location`
fn follow_login_redirects(session: &Session, login_url: Url, body: Vec<u8>) -> Result<Vec<Url>> {
    let mut history: Vec<Url> = Vec::new();
    let mut method = Method::Post;
    let mut url = login_url;
    let mut body = Some(body);

    loop {
        let extra: &[(&str, &str)] = if body.is_some() {
            &[("Content-Type", "application/json")]
        } else {
            &[]
        };
        let resp = session.send(method, url.clone(), body.clone(), extra)?;

        if !resp.is_redirect() {
            if history.is_empty() {
                return Err(match resp.status {
                    401 | 403 => EnovosError::auth(format!(
                        "credentials rejected (HTTP {})",
                        resp.status
                    )),
                    status => EnovosError::auth(format!(
                        "login answered HTTP {} without a redirect",
                        status
                    )),
                });
            }
            return Ok(history);
        }

        if history.len() >= MAX_REDIRECTS {
            return Err(EnovosError::auth(format!(
                "login redirect chain exceeded {} hops",
                MAX_REDIRECTS
            )));
        }

        let location = resp.header("Location").ok_or_else(|| {
            EnovosError::auth(format!("HTTP {} redirect without Location", resp.status))
        })?;
        let next = url.join(location).map_err(|e| {
            EnovosError::auth(format!("invalid redirect Location '{}': {}", location, e))
        })?;
        history.push(next.clone());

        // 307/308 keep method and body, everything else degrades to GET
        if matches!(resp.status, 301..=303) {
            method = Method::Get;
            body = None;
        }
        url = next;
        url.set_fragment(None);
    }
}

/// Read `access_token` from the fragment of the last hop that has one
pub fn extract_access_token(history: &[Url]) -> Result<String> {
    if history.is_empty() {
        return Err(EnovosError::auth(
            "login response carried no redirect history",
        ));
    }

    let hop = history
        .iter()
        .rev()
        .find(|u| u.fragment().is_some_and(|f| !f.is_empty()))
        .ok_or_else(|| EnovosError::auth("no redirect carried a URL fragment"))?;

    fragment_param(hop, "access_token")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| EnovosError::auth("redirect fragment does not contain access_token"))
}

/// Parse a URL fragment as a query string and look up one key
fn fragment_param(url: &Url, key: &str) -> Option<String> {
    let mut carrier = url.clone();
    carrier.set_query(url.fragment());
    carrier.set_fragment(None);
    carrier
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
