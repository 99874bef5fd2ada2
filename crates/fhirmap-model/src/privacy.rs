//! Redaction of record values in diagnostics.
//!
//! Source records carry patient data. Library crates pass every value they
//! log through [`redact_value`]; the binary flips the switch when the user
//! opts into data logging.

use std::sync::atomic::{AtomicBool, Ordering};

static LOG_DATA_ENABLED: AtomicBool = AtomicBool::new(false);

/// Placeholder logged instead of record values.
pub const REDACTED_VALUE: &str = "[REDACTED]";

pub fn set_log_data_enabled(enabled: bool) {
    LOG_DATA_ENABLED.store(enabled, Ordering::Release);
}

pub fn log_data_enabled() -> bool {
    LOG_DATA_ENABLED.load(Ordering::Acquire)
}

/// Returns the value when data logging is enabled, otherwise a redacted token.
pub fn redact_value(value: &str) -> &str {
    if log_data_enabled() {
        value
    } else {
        REDACTED_VALUE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_redacted_by_default() {
        assert_eq!(redact_value("Doe"), REDACTED_VALUE);
    }
}
