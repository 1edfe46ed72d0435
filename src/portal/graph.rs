//! User → Customer → Contract navigation
//!
//! Each level is fetched on first access and memoized in a `OnceCell`, so a
//! property costs at most one round-trip for the lifetime of its holder.
//! Every node keeps a plain `&MyEnovos` back-reference to reach the shared
//! authenticated session.

use crate::error::Result;
use crate::logging::{LogContext, get_logger_with_context};
use crate::points::{ContractTags, TimeSeriesPoint, normalize_readings};
use crate::portal::MyEnovos;
use crate::portal::history::{ConsumptionReading, fetch_history};
use crate::window::TimeWindow;
use once_cell::sync::OnceCell;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Service type of electricity contracts
pub const KIND_ELECTRICITY: &str = "Electricity";

/// Body of the userinfo endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserInfo {
    /// Customer numbers of the principal (`partner_id`: one or many)
    #[serde(rename = "partner_id", deserialize_with = "one_or_many_ids")]
    pub customer_nrs: Vec<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

/// Contract record as delivered by the portal
///
/// Fields the client relies on are typed; everything else is kept in
/// `extra` so the record round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractData {
    #[serde(rename = "vkont", deserialize_with = "lenient_string")]
    pub contract_nr: String,
    #[serde(rename = "customerid", deserialize_with = "lenient_string")]
    pub customer_id: String,
    #[serde(rename = "devicedesignation", deserialize_with = "lenient_string")]
    pub device_designation: String,
    #[serde(rename = "productname")]
    pub product_name: String,
    #[serde(rename = "installationid", deserialize_with = "lenient_string")]
    pub installation_id: String,
    pub installation_service_type: String,
    pub open: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

fn id_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    id_from_value(Value::deserialize(d)?)
        .ok_or_else(|| D::Error::custom("expected a string or a number"))
}

fn one_or_many_ids<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<Vec<String>, D::Error> {
    match Value::deserialize(d)? {
        Value::Array(items) => items
            .into_iter()
            .map(|v| {
                id_from_value(v).ok_or_else(|| D::Error::custom("expected a string or a number"))
            })
            .collect(),
        other => id_from_value(other)
            .map(|id| vec![id])
            .ok_or_else(|| D::Error::custom("expected an id or a list of ids")),
    }
}

/// The authenticated principal
#[derive(Debug)]
pub struct User<'a> {
    client: &'a MyEnovos,
    info: OnceCell<UserInfo>,
    customers: OnceCell<Vec<Customer<'a>>>,
}

impl<'a> User<'a> {
    pub(crate) fn new(client: &'a MyEnovos) -> Self {
        Self {
            client,
            info: OnceCell::new(),
            customers: OnceCell::new(),
        }
    }

    /// Userinfo document, fetched on first access
    pub fn info(&self) -> Result<&UserInfo> {
        self.info.get_or_try_init(|| {
            let url = self.client.endpoints().userinfo()?;
            self.client.get_json(url, "userinfo")
        })
    }

    pub fn customer_nrs(&self) -> Result<&[String]> {
        Ok(&self.info()?.customer_nrs)
    }

    /// Customers in portal order
    pub fn customers(&self) -> Result<&[Customer<'a>]> {
        self.customers
            .get_or_try_init(|| {
                Ok(self
                    .info()?
                    .customer_nrs
                    .iter()
                    .map(|nr| Customer::new(self.client, nr.clone()))
                    .collect())
            })
            .map(Vec::as_slice)
    }

    /// `None` when the user has no such customer
    pub fn customer_by_nr(&self, customer_nr: &str) -> Result<Option<&Customer<'a>>> {
        Ok(self
            .customers()?
            .iter()
            .find(|c| c.customer_nr() == customer_nr))
    }
}

/// One customer account of the user
#[derive(Debug)]
pub struct Customer<'a> {
    client: &'a MyEnovos,
    customer_nr: String,
    contracts: OnceCell<Vec<Contract<'a>>>,
}

impl<'a> Customer<'a> {
    pub(crate) fn new(client: &'a MyEnovos, customer_nr: String) -> Self {
        Self {
            client,
            customer_nr,
            contracts: OnceCell::new(),
        }
    }

    pub fn customer_nr(&self) -> &str {
        &self.customer_nr
    }

    /// Contracts in portal order, fetched on first access
    pub fn contracts(&self) -> Result<&[Contract<'a>]> {
        self.contracts
            .get_or_try_init(|| {
                let logger = get_logger_with_context(
                    LogContext::new("graph").with_customer(&self.customer_nr),
                );
                let url = self.client.endpoints().contracts(&self.customer_nr)?;
                let records: Vec<ContractData> = self.client.get_json(url, "contracts")?;
                logger.debug(&format!("Fetched {} contract(s)", records.len()));
                Ok(records
                    .into_iter()
                    .map(|data| Contract::new(self.client, data))
                    .collect())
            })
            .map(Vec::as_slice)
    }

    /// `None` when the customer has no such contract
    pub fn contract_by_nr(&self, contract_nr: &str) -> Result<Option<&Contract<'a>>> {
        Ok(self
            .contracts()?
            .iter()
            .find(|c| c.contract_nr() == contract_nr))
    }
}

/// One supply contract
#[derive(Debug)]
pub struct Contract<'a> {
    client: &'a MyEnovos,
    data: ContractData,
}

impl<'a> Contract<'a> {
    pub(crate) fn new(client: &'a MyEnovos, data: ContractData) -> Self {
        Self { client, data }
    }

    pub fn data(&self) -> &ContractData {
        &self.data
    }

    pub fn contract_nr(&self) -> &str {
        &self.data.contract_nr
    }

    pub fn customer_id(&self) -> &str {
        &self.data.customer_id
    }

    /// Installation service type, e.g. "Electricity"
    pub fn kind(&self) -> &str {
        &self.data.installation_service_type
    }

    pub fn is_open(&self) -> bool {
        self.data.open
    }

    pub fn product_name(&self) -> &str {
        &self.data.product_name
    }

    pub fn tags(&self) -> ContractTags {
        ContractTags::from(&self.data)
    }

    /// Raw load-profile readings for the window, in portal order
    pub fn history(&self, window: &TimeWindow) -> Result<Vec<ConsumptionReading>> {
        fetch_history(self.client, &self.data, window)
    }

    /// Confirmed readings for the window as time-series points
    pub fn points(&self, window: &TimeWindow) -> Result<Vec<TimeSeriesPoint>> {
        let readings = self.history(window)?;
        normalize_readings(&readings, &self.tags())
    }
}

impl fmt::Display for Contract<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data.product_name)
    }
}
