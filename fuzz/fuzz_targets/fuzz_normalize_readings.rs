#![no_main]
use libfuzzer_sys::fuzz_target;
use myenovos::points::{ContractTags, normalize_readings};
use myenovos::portal::ConsumptionReading;

fuzz_target!(|data: &[u8]| {
    // Treat the input as a load-profile response body
    let Ok(readings) = serde_json::from_slice::<Vec<ConsumptionReading>>(data) else {
        return;
    };
    let tags = ContractTags {
        contract_nr: "1".to_string(),
        customer_nr: "2".to_string(),
        device_designation: "3".to_string(),
        product_name: "fuzz".to_string(),
        installation_id: "4".to_string(),
        installation_service_type: "Electricity".to_string(),
    };

    if let Ok(points) = normalize_readings(&readings, &tags) {
        assert!(points.len() <= readings.len());
        assert!(points.iter().all(|p| p.value().is_finite()));
    }
});
