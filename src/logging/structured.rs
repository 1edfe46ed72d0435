use std::fmt;
use tracing::{debug, info, warn};

/// Fields attached to every message of one logger
///
/// Rendered as `component=.. customer_nr=.. contract_nr=.. key=..`, in
/// insertion order for the extra fields.
#[derive(Debug, Clone, Default)]
pub struct LogContext {
    pub component: String,
    pub customer_nr: Option<String>,
    pub contract_nr: Option<String>,
    pub fields: Vec<(&'static str, String)>,
}

impl LogContext {
    pub fn new(component: &str) -> Self {
        Self {
            component: component.to_string(),
            ..Self::default()
        }
    }

    pub fn with_customer(mut self, customer_nr: &str) -> Self {
        self.customer_nr = Some(customer_nr.to_string());
        self
    }

    pub fn with_contract(mut self, contract_nr: &str) -> Self {
        self.contract_nr = Some(contract_nr.to_string());
        self
    }

    /// Attach one more field; a repeated key replaces the earlier value
    pub fn with_field<V: fmt::Display>(mut self, key: &'static str, value: V) -> Self {
        let value = value.to_string();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
        self
    }
}

impl fmt::Display for LogContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "component={}", self.component)?;
        if let Some(nr) = &self.customer_nr {
            write!(f, " customer_nr={}", nr)?;
        }
        if let Some(nr) = &self.contract_nr {
            write!(f, " contract_nr={}", nr)?;
        }
        for (key, value) in &self.fields {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Logger that prefixes its context to every message
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    context: LogContext,
}

impl StructuredLogger {
    pub fn new(context: LogContext) -> Self {
        Self { context }
    }

    pub fn info(&self, message: &str) {
        info!(ctx = %self.context, "{}", message);
    }

    pub fn warn(&self, message: &str) {
        warn!(ctx = %self.context, "{}", message);
    }

    pub fn debug(&self, message: &str) {
        debug!(ctx = %self.context, "{}", message);
    }
}

/// Logger for a component without customer or contract context
pub fn get_logger(component: &str) -> StructuredLogger {
    StructuredLogger::new(LogContext::new(component))
}

pub fn get_logger_with_context(context: LogContext) -> StructuredLogger {
    StructuredLogger::new(context)
}
