//! # myenovos - consumption data from the my.enovos.lu customer portal
//!
//! A small client for the Enovos (Luxembourg) customer portal that logs in,
//! walks the user's customers and contracts, downloads the load profile of
//! one contract and turns its confirmed readings into time-series points.
//!
//! ## Features
//!
//! - **Session login**: access token recovered from the login redirect chain
//! - **Lazy resource graph**: each level fetched once and cached
//! - **MACO normalization**: only confirmed readings become points
//! - **Sinks**: JSON on stdout or InfluxDB line protocol
//! - **Configuration**: YAML-based configuration with validation
//!
//! ## Architecture
//!
//! - `config`: Configuration management and validation
//! - `logging`: Structured logging and tracing
//! - `transport`: Blocking HTTP seam with cookie-keeping session
//! - `portal`: Authentication and the User → Customer → Contract graph
//! - `selector`: Default customer/contract resolution
//! - `window`: Time window resolution
//! - `points`: Reading normalization
//! - `sink`: JSON and InfluxDB outputs
//! - `app`: End-to-end flows used by the binary

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod points;
pub mod portal;
pub mod selector;
pub mod sink;
pub mod transport;
pub mod window;

// Re-export commonly used types
pub use config::Config;
pub use error::{EnovosError, Result};
pub use points::{ContractTags, TimeSeriesPoint, normalize_readings};
pub use portal::{Contract, Credentials, Customer, MyEnovos, User};
pub use selector::{Selection, Selector};
pub use sink::{InfluxSink, JsonSink, PointSink};
pub use window::{CalendarZone, TimeWindow};
