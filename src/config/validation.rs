use crate::config::models::{DirectoryConfig, EngineConfig};

/// Validation result type alias
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, thiserror::Error, Clone)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Invalid disable property '{key}': {reason}")]
    InvalidDisableProperty { key: String, reason: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },
}

/// Engine configuration validator
pub struct EngineConfigValidator;

impl EngineConfigValidator {
    /// Validate the entire engine configuration, reporting every problem at once
    pub fn validate(config: &EngineConfig) -> ValidationResult<()> {
        let mut errors = Self::validate_directories(&config.directories);

        for key in &config.disabled_filters {
            if let Err(e) = Self::validate_disable_property(key) {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else if errors.len() == 1 {
            Err(errors.remove(0))
        } else {
            Err(ValidationError::ValidationFailed {
                message: Self::format_multiple_errors(&errors),
            })
        }
    }

    fn validate_directories(directories: &DirectoryConfig) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        for (index, path) in directories.paths.iter().enumerate() {
            if path.trim().is_empty() {
                errors.push(ValidationError::InvalidField {
                    field: format!("directories.paths[{index}]"),
                    message: "Directory path must not be empty".to_string(),
                });
            }
        }

        if directories.suffix.is_empty() {
            errors.push(ValidationError::InvalidField {
                field: "directories.suffix".to_string(),
                message: "Suffix must not be empty".to_string(),
            });
        }

        match humantime::parse_duration(&directories.poll_interval) {
            Ok(interval) if interval.is_zero() => errors.push(ValidationError::InvalidField {
                field: "directories.poll_interval".to_string(),
                message: "Poll interval must be greater than zero".to_string(),
            }),
            Ok(_) => {}
            Err(e) => errors.push(ValidationError::InvalidField {
                field: "directories.poll_interval".to_string(),
                message: format!("'{}' is not a duration: {e}", directories.poll_interval),
            }),
        }

        errors
    }

    /// Disable properties follow `zuul.<filter>.<type>.disable`
    fn validate_disable_property(key: &str) -> ValidationResult<()> {
        let parts: Vec<&str> = key.split('.').collect();
        if parts.len() < 4 || parts[0] != "zuul" || parts[parts.len() - 1] != "disable" {
            return Err(ValidationError::InvalidDisableProperty {
                key: key.to_string(),
                reason: "Expected format 'zuul.<filter>.<type>.disable'".to_string(),
            });
        }
        if parts[1..parts.len() - 1].iter().any(|part| part.is_empty()) {
            return Err(ValidationError::InvalidDisableProperty {
                key: key.to_string(),
                reason: "Filter name and type must not be empty".to_string(),
            });
        }
        Ok(())
    }

    fn format_multiple_errors(errors: &[ValidationError]) -> String {
        let lines: Vec<String> = errors
            .iter()
            .enumerate()
            .map(|(i, e)| format!("  {}. {}", i + 1, e))
            .collect();
        format!("{} problems found:\n{}", errors.len(), lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfigValidator::validate(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = EngineConfig::default();
        config.directories.poll_interval = "0s".to_string();

        let result = EngineConfigValidator::validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::InvalidField { ref field, .. })
                if field == "directories.poll_interval"
        ));
    }

    #[test]
    fn test_disable_property_format() {
        assert!(EngineConfigValidator::validate_disable_property("zuul.Auth.pre.disable").is_ok());
        assert!(EngineConfigValidator::validate_disable_property("zuul.Auth.disable").is_err());
        assert!(EngineConfigValidator::validate_disable_property("app.Auth.pre.disable").is_err());
        assert!(EngineConfigValidator::validate_disable_property("zuul..pre.disable").is_err());
    }

    #[test]
    fn test_multiple_errors_are_aggregated() {
        let mut config = EngineConfig::default();
        config.directories.suffix = String::new();
        config.directories.paths = vec![" ".to_string()];
        config.disabled_filters = vec!["bogus".to_string()];

        match EngineConfigValidator::validate(&config) {
            Err(ValidationError::ValidationFailed { message }) => {
                assert!(message.starts_with("3 problems found"));
                assert!(message.contains("directories.suffix"));
                assert!(message.contains("bogus"));
            }
            other => panic!("expected aggregated failure, got {other:?}"),
        }
    }
}
