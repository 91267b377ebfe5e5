use crate::utils::error::{RankError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 檢查必填文字欄位，回傳去除前後空白後的值
pub fn validate_non_empty_string<'a>(field_name: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RankError::validation(
            field_name,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(trimmed)
}

pub fn validate_position(field_name: &str, position: u32) -> Result<u32> {
    if position == 0 {
        return Err(RankError::validation(
            field_name,
            "Position must be a positive integer (1 = top result)",
        ));
    }
    Ok(position)
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(RankError::ConfigValidationError {
            field: field_name.to_string(),
            message: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(RankError::ConfigValidationError {
            field: field_name.to_string(),
            message: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(RankError::ConfigValidationError {
            field: field_name.to_string(),
            message: format!("Value must be at least {}, got {}", min_value, value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(RankError::ConfigValidationError {
            field: field_name.to_string(),
            message: format!("Value {} must be between {} and {}", value, min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_non_empty_string_trims() {
        assert_eq!(
            validate_non_empty_string("name", "  Joe's Coffee  ").unwrap(),
            "Joe's Coffee"
        );
        assert!(validate_non_empty_string("name", "").is_err());
        assert!(validate_non_empty_string("name", " \t\n").is_err());
    }

    #[test]
    fn test_validate_position() {
        assert_eq!(validate_position("position", 1).unwrap(), 1);
        assert!(matches!(
            validate_position("position", 0),
            Err(RankError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("tracking.max_position", 20u32, 1, 100).is_ok());
        assert!(validate_range("tracking.max_position", 0u32, 1, 100).is_err());
        assert!(validate_range("tracking.max_position", 101u32, 1, 100).is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("report.output_path", "./reports").is_ok());
        assert!(validate_path("report.output_path", "").is_err());
        assert!(validate_path("report.output_path", "bad\0path").is_err());
    }
}
