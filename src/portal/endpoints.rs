//! URL construction for the identity provider and the customer portal service

use crate::config::PortalConfig;
use crate::error::{EnovosError, Result};
use reqwest::Url;

/// OBIS channel for total active energy; the only channel fetched
pub const OBIS_ACTIVE_ENERGY_TOTAL: &str = "1-1:1.29.0";

/// `activity` parameter the portal expects on load-profile requests
pub const LOAD_PROFILE_ACTIVITY: &str = "01";

/// Parameters of one load-profile request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadProfileQuery {
    pub customer_nr: String,
    pub contract_nr: String,
    pub pod: String,
    pub installation_id: String,
    pub start_ms: i64,
    pub end_ms: i64,
}

/// Base URLs of the two services behind my.enovos.lu
#[derive(Debug, Clone)]
pub struct PortalEndpoints {
    auth_base: Url,
    portal_base: Url,
}

impl PortalEndpoints {
    pub fn new(auth_base: &str, portal_base: &str) -> Result<Self> {
        Ok(Self {
            auth_base: parse_base("auth_base_url", auth_base)?,
            portal_base: parse_base("portal_base_url", portal_base)?,
        })
    }

    pub fn from_config(cfg: &PortalConfig) -> Result<Self> {
        Self::new(&cfg.auth_base_url, &cfg.portal_base_url)
    }

    pub fn login(&self) -> Result<Url> {
        with_segments(&self.auth_base, &["login"])
    }

    pub fn userinfo(&self) -> Result<Url> {
        with_segments(&self.auth_base, &["api", "userinfo"])
    }

    pub fn contracts(&self, customer_nr: &str) -> Result<Url> {
        with_segments(&self.portal_base, &["customer", customer_nr, "contracts"])
    }

    pub fn load_profile(&self, query: &LoadProfileQuery) -> Result<Url> {
        let mut url = with_segments(
            &self.portal_base,
            &[
                "customer",
                &query.customer_nr,
                "contracts",
                &query.contract_nr,
                "loadprofile",
            ],
        )?;
        url.query_pairs_mut()
            .append_pair("activity", LOAD_PROFILE_ACTIVITY)
            .append_pair("pod", &query.pod)
            .append_pair("obis", OBIS_ACTIVE_ENERGY_TOTAL)
            .append_pair("start", &query.start_ms.to_string())
            .append_pair("end", &query.end_ms.to_string())
            .append_pair("vkont", &query.contract_nr)
            .append_pair("installationid", &query.installation_id);
        Ok(url)
    }
}

fn parse_base(field: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value)
        .map_err(|e| EnovosError::validation(field, format!("Invalid URL '{}': {}", value, e)))?;
    if url.cannot_be_a_base() {
        return Err(EnovosError::validation(
            field,
            format!("'{}' cannot be used as a base URL", value),
        ));
    }
    Ok(url)
}

fn with_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| EnovosError::config(format!("'{}' cannot be used as a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
