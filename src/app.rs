//! End-to-end flows shared by the CLI commands

use crate::config::Config;
use crate::error::{EnovosError, Result};
use crate::logging::{LogContext, get_logger, get_logger_with_context};
use crate::portal::{ContractData, Credentials, MyEnovos};
use crate::selector::{Selection, Selector};
use crate::sink::PointSink;
use crate::window::TimeWindow;

/// Outcome of one [`run`]
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub customer_nr: String,
    pub contract_nr: String,
    pub window: TimeWindow,
    pub points: usize,
}

/// Select the contract, fetch its history over `window`, normalize it and
/// hand the points to `sink`
///
/// The sink is prepared only once a contract has been selected, and no
/// points reach it unless every earlier step succeeded.
pub fn run(
    client: &MyEnovos,
    selection: &Selection,
    window: &TimeWindow,
    sink: &mut dyn PointSink,
) -> Result<RunReport> {
    let user = client.user();
    let contract = Selector::new().select(&user, selection)?;

    let logger = get_logger_with_context(
        LogContext::new("app")
            .with_customer(contract.customer_id())
            .with_contract(contract.contract_nr())
            .with_field("start", window.start().to_rfc3339())
            .with_field("end", window.end().to_rfc3339()),
    );
    logger.info(&format!("Fetching {}", contract));

    sink.prepare()?;
    let points = contract.points(window)?;
    let written = sink.write_points(&points)?;
    logger.info(&format!("{} point(s) written", written));

    Ok(RunReport {
        customer_nr: contract.customer_id().to_string(),
        contract_nr: contract.contract_nr().to_string(),
        window: *window,
        points: written,
    })
}

/// Contract records of one customer (the default customer when `None`)
pub fn list_contracts(client: &MyEnovos, customer_nr: Option<&str>) -> Result<Vec<ContractData>> {
    let user = client.user();
    let customer = Selector::new().select_customer(&user, customer_nr)?;
    let contracts = customer.contracts()?;
    if contracts.is_empty() {
        get_logger("app").warn(&format!(
            "Customer {} has no contracts",
            customer.customer_nr()
        ));
    }
    Ok(contracts.iter().map(|c| c.data().clone()).collect())
}

/// Credentials from the merged configuration
pub fn credentials_from(config: &Config) -> Result<Credentials> {
    Credentials::new(
        config.credentials.username.as_str(),
        config.credentials.password.as_str(),
    )
    .map_err(|e| match e {
        EnovosError::Validation { field, message } => EnovosError::validation(
            field,
            format!(
                "{} (pass it on the command line, set MYENOVOS_USERNAME/MYENOVOS_PASSWORD or use the config file)",
                message
            ),
        ),
        other => other,
    })
}
