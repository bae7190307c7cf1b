//! Engine configuration.
//!
//! Explicit, immutable configuration passed into [`Validator`]
//! construction. The crate never reads environment variables; callers own
//! every knob, which keeps validation runs deterministic and safe to run
//! from any thread.
//!
//! [`Validator`]: crate::engine::Validator

/// Configuration for the validation walk.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Cap on element-level violations reported for a single array.
    ///
    /// When the elements of one sequence produce more leaf violations
    /// than this, the individual entries are replaced by a single
    /// "too many errors" summary so a fully-corrupted 200-entry table
    /// does not drown the report.
    pub element_error_cap: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self { element_error_cap: 10 }
    }
}

/// Rejected configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("element_error_cap must be greater than zero")]
    ZeroElementErrorCap,
}

/// Validate a configuration object before use.
pub fn validate_config(cfg: &ValidatorConfig) -> Result<(), ConfigError> {
    if cfg.element_error_cap == 0 {
        return Err(ConfigError::ZeroElementErrorCap);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        validate_config(&ValidatorConfig::default()).unwrap();
    }

    #[test]
    fn zero_cap_detected() {
        let cfg = ValidatorConfig { element_error_cap: 0 };
        assert!(validate_config(&cfg).is_err());
    }
}
