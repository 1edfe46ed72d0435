use super::*;

/// Desktop browser identity; the portal rejects requests without one
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/90.0.4430.93 Safari/537.36";

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            auth_base_url: "https://auth-customer.enovos.lu".to_string(),
            portal_base_url: "https://customer-portal-service.enocloud.eu/v3/cp".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: None,
        }
    }
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8086,
            database: String::new(),
            user: Some("root".to_string()),
            password: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: None,
            backup_count: 5,
            console_output: true,
            json_format: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portal: PortalConfig::default(),
            credentials: CredentialsConfig::default(),
            selection: SelectionConfig::default(),
            influx: InfluxConfig::default(),
            logging: LoggingConfig::default(),
            timezone: "local".to_string(),
        }
    }
}
