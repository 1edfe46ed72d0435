//! Command-line interface

use crate::config::Config;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "myenovos", version = env!("APP_VERSION"))]
#[command(about = "Fetch electricity consumption from my.enovos.lu")]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print confirmed consumption points as JSON
    History {
        #[command(flatten)]
        login: LoginArgs,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Write confirmed consumption points to InfluxDB
    Influx {
        #[command(flatten)]
        login: LoginArgs,
        /// Target database
        database: Option<String>,
        #[command(flatten)]
        target: TargetArgs,
        #[arg(long)]
        influx_host: Option<String>,
        #[arg(long)]
        influx_port: Option<u16>,
        #[arg(long)]
        influx_user: Option<String>,
        #[arg(long)]
        influx_password: Option<String>,
    },
    /// List the contracts of a customer
    Contracts {
        #[command(flatten)]
        login: LoginArgs,
        #[arg(long)]
        customer: Option<String>,
    },
}

#[derive(Args, Debug, Default)]
pub struct LoginArgs {
    /// my.enovos.lu username
    #[arg(env = "MYENOVOS_USERNAME", hide_env_values = true)]
    pub username: Option<String>,

    /// my.enovos.lu password
    #[arg(env = "MYENOVOS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct TargetArgs {
    /// Customer number (default: first customer)
    #[arg(long)]
    pub customer: Option<String>,

    /// Contract number (default: first open electricity contract)
    #[arg(long)]
    pub contract: Option<String>,

    /// Window start as a Unix timestamp (default: start of the month)
    #[arg(short, long, allow_negative_numbers = true)]
    pub start_timestamp: Option<f64>,

    /// Window end as a Unix timestamp (default: now)
    #[arg(short, long, allow_negative_numbers = true)]
    pub end_timestamp: Option<f64>,
}

impl LoginArgs {
    fn apply_to(&self, config: &mut Config) {
        if let Some(username) = &self.username {
            config.credentials.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.credentials.password = password.clone();
        }
    }
}

impl TargetArgs {
    fn apply_to(&self, config: &mut Config) {
        let sel = &mut config.selection;
        if self.customer.is_some() {
            sel.customer_nr = self.customer.clone();
        }
        if self.contract.is_some() {
            sel.contract_nr = self.contract.clone();
        }
        if self.start_timestamp.is_some() {
            sel.start_timestamp = self.start_timestamp;
        }
        if self.end_timestamp.is_some() {
            sel.end_timestamp = self.end_timestamp;
        }
    }
}

impl Cli {
    /// Merge command-line values over the loaded configuration
    pub fn apply_to(&self, config: &mut Config) {
        if self.verbose {
            config.logging.level = "DEBUG".to_string();
        }

        match &self.command {
            Command::History { login, target } => {
                login.apply_to(config);
                target.apply_to(config);
            }
            Command::Influx {
                login,
                database,
                target,
                influx_host,
                influx_port,
                influx_user,
                influx_password,
            } => {
                login.apply_to(config);
                target.apply_to(config);
                let influx = &mut config.influx;
                if let Some(db) = database {
                    influx.database = db.clone();
                }
                if let Some(host) = influx_host {
                    influx.host = host.clone();
                }
                if let Some(port) = influx_port {
                    influx.port = *port;
                }
                if influx_user.is_some() {
                    influx.user = influx_user.clone();
                }
                if influx_password.is_some() {
                    influx.password = influx_password.clone();
                }
            }
            Command::Contracts { login, customer } => {
                login.apply_to(config);
                if customer.is_some() {
                    config.selection.customer_nr = customer.clone();
                }
            }
        }
    }
}
