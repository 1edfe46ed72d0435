//! Authenticated client for the my.enovos.lu customer portal
//!
//! [`MyEnovos`] is the root of the resource graph. It owns the credentials
//! and, once the first request needs it, the single authenticated session
//! that every `User`, `Customer` and `Contract` borrows for its lookups.

pub mod auth;
pub mod endpoints;
pub mod graph;
pub mod history;

pub use auth::{AuthenticatedContext, Credentials, authenticate};
pub use endpoints::{LoadProfileQuery, OBIS_ACTIVE_ENERGY_TOTAL, PortalEndpoints};
pub use graph::{Contract, ContractData, Customer, KIND_ELECTRICITY, User, UserInfo};
pub use history::ConsumptionReading;

use crate::config::{Config, DEFAULT_USER_AGENT};
use crate::error::Result;
use crate::transport::{HttpTransport, ReqwestTransport};
use once_cell::sync::OnceCell;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Root client; authenticates lazily on first use
pub struct MyEnovos {
    credentials: Credentials,
    endpoints: PortalEndpoints,
    user_agent: String,
    transport: Arc<dyn HttpTransport>,
    context: OnceCell<AuthenticatedContext>,
}

impl MyEnovos {
    pub fn new(
        credentials: Credentials,
        endpoints: PortalEndpoints,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            credentials,
            endpoints,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            transport,
            context: OnceCell::new(),
        }
    }

    /// Build a client over the real network from configuration
    pub fn from_config(config: &Config, credentials: Credentials) -> Result<Self> {
        let transport = ReqwestTransport::new(config.portal.timeout_seconds.map(Duration::from_secs))?;
        let endpoints = PortalEndpoints::from_config(&config.portal)?;
        Ok(Self::new(credentials, endpoints, Arc::new(transport))
            .with_user_agent(&config.portal.user_agent))
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn endpoints(&self) -> &PortalEndpoints {
        &self.endpoints
    }

    pub fn username(&self) -> &str {
        self.credentials.username()
    }

    /// The authenticated session, logging in on first call
    ///
    /// A failed login leaves the cell empty; callers are expected to abort.
    pub fn context(&self) -> Result<&AuthenticatedContext> {
        self.context.get_or_try_init(|| {
            authenticate(
                Arc::clone(&self.transport),
                &self.endpoints,
                &self.user_agent,
                &self.credentials,
            )
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.context.get().is_some()
    }

    /// Wrapper around the authenticated principal; no request is made here
    pub fn user(&self) -> User<'_> {
        User::new(self)
    }

    pub(crate) fn get_json<T: DeserializeOwned>(&self, url: Url, endpoint: &str) -> Result<T> {
        self.context()?.get_json(url, endpoint)
    }
}

impl fmt::Debug for MyEnovos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MyEnovos")
            .field("username", &self.credentials.username())
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
