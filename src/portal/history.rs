//! Load-profile retrieval for one contract

use crate::error::Result;
use crate::logging::{LogContext, get_logger_with_context};
use crate::portal::MyEnovos;
use crate::portal::endpoints::LoadProfileQuery;
use crate::portal::graph::ContractData;
use crate::window::TimeWindow;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One interval reading as delivered by the portal
///
/// Only `status` is interpreted at this stage; `ts` and `value` are parsed
/// during normalization and only for confirmed readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionReading {
    #[serde(default)]
    pub ts: String,
    pub status: String,
    #[serde(default)]
    pub value: Value,
}

/// Fetch the raw readings of `contract` over `window`
pub fn fetch_history(
    client: &MyEnovos,
    contract: &ContractData,
    window: &TimeWindow,
) -> Result<Vec<ConsumptionReading>> {
    let query = LoadProfileQuery {
        customer_nr: contract.customer_id.clone(),
        contract_nr: contract.contract_nr.clone(),
        pod: contract.device_designation.clone(),
        installation_id: contract.installation_id.clone(),
        start_ms: window.start_millis(),
        end_ms: window.end_millis(),
    };
    let url = client.endpoints().load_profile(&query)?;

    let logger = get_logger_with_context(
        LogContext::new("history")
            .with_customer(&contract.customer_id)
            .with_contract(&contract.contract_nr)
            .with_field("start_ms", query.start_ms)
            .with_field("end_ms", query.end_ms),
    );
    logger.debug("Requesting load profile");
    let readings: Vec<ConsumptionReading> = client.get_json(url, "loadprofile")?;
    logger.debug(&format!("Received {} reading(s)", readings.len()));
    Ok(readings)
}
