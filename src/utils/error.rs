use crate::domain::model::EntityKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RankError {
    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Rank check failed for '{keyword}': {message}")]
    RankCheckError { keyword: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed on '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RankError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Lookup,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RankError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        RankError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        RankError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            RankError::ValidationError { .. } => ErrorCategory::Validation,
            RankError::NotFound { .. } => ErrorCategory::Lookup,
            RankError::ConfigError { .. } | RankError::ConfigValidationError { .. } => {
                ErrorCategory::Configuration
            }
            RankError::RankCheckError { .. }
            | RankError::CsvError(_)
            | RankError::IoError(_)
            | RankError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 使用者輸入錯誤只需提示，不影響其他狀態
            RankError::ValidationError { .. } | RankError::NotFound { .. } => ErrorSeverity::Low,
            RankError::RankCheckError { .. } => ErrorSeverity::Medium,
            RankError::ConfigError { .. } | RankError::ConfigValidationError { .. } => {
                ErrorSeverity::High
            }
            RankError::CsvError(_) | RankError::SerializationError(_) => ErrorSeverity::High,
            RankError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// 給展示層的短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            RankError::ValidationError { field, message } => {
                format!("Invalid {}: {}", field, message)
            }
            RankError::NotFound { kind, id } => format!("No {} with id '{}'", kind, id),
            RankError::RankCheckError { keyword, .. } => {
                format!("Could not check the ranking for \"{}\"", keyword)
            }
            RankError::ConfigError { .. } | RankError::ConfigValidationError { .. } => {
                "The tracker configuration is invalid".to_string()
            }
            RankError::CsvError(_) | RankError::SerializationError(_) => {
                "Failed to write the ranking report".to_string()
            }
            RankError::IoError(e) => format!("File system error: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            RankError::ValidationError { field, .. } => {
                format!("Provide a non-empty value for '{}'", field)
            }
            RankError::NotFound { kind, .. } => {
                format!("Refresh the {} list and pick an existing entry", kind)
            }
            RankError::RankCheckError { .. } => "Retry the rank check later".to_string(),
            RankError::ConfigError { .. } => {
                "Check that the config file exists and is valid TOML".to_string()
            }
            RankError::ConfigValidationError { field, .. } => {
                format!("Fix the '{}' setting in the config file", field)
            }
            RankError::CsvError(_) | RankError::SerializationError(_) => {
                "Check the exported data for unusual characters".to_string()
            }
            RankError::IoError(_) => {
                "Check that the output directory exists and is writable".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_low_severity() {
        let err = RankError::validation("term", "cannot be empty");
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.severity(), ErrorSeverity::Low);

        let err = RankError::not_found(EntityKind::Keyword, "42");
        assert_eq!(err.category(), ErrorCategory::Lookup);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.to_string(), "keyword not found: 42");
    }

    #[test]
    fn test_io_error_is_critical() {
        let err: RankError = std::io::Error::new(std::io::ErrorKind::Other, "disk").into();
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.recovery_suggestion().contains("writable"));
    }
}
