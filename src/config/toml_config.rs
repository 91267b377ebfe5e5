use crate::adapters::rank_checker::{DEFAULT_MAX_POSITION, DEFAULT_MIN_POSITION};
use crate::app::report::ReportFormat;
use crate::core::timeseries::AlignOptions;
use crate::utils::error::{RankError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub alignment: AlignmentConfig,
    #[serde(default)]
    pub report: Option<ReportConfig>,
    #[serde(default)]
    pub businesses: Vec<BusinessSeed>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingScope {
    #[default]
    Selected,
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_min_position")]
    pub min_position: u32,
    #[serde(default = "default_max_position")]
    pub max_position: u32,
    pub seed: Option<u64>,
    #[serde(default)]
    pub scope: TrackingScope,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: default_interval_ms(),
            min_position: default_min_position(),
            max_position: default_max_position(),
            seed: None,
            scope: TrackingScope::default(),
        }
    }
}

fn default_interval_ms() -> u64 {
    60_000
}

fn default_min_position() -> u32 {
    DEFAULT_MIN_POSITION
}

fn default_max_position() -> u32 {
    DEFAULT_MAX_POSITION
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlignmentConfig {
    /// 0 表示以完全相同的時間戳對齊
    #[serde(default)]
    pub tolerance_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub output_path: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
}

fn default_formats() -> Vec<String> {
    vec!["csv".to_string(), "json".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessSeed {
    pub name: String,
    pub domain: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl TrackerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| RankError::ConfigError {
            message: format!("Cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RankError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${TRACKER_SEED})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| RankError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn tracking_interval(&self) -> Duration {
        Duration::from_millis(self.tracking.interval_ms)
    }

    pub fn align_options(&self) -> AlignOptions {
        AlignOptions::from_millis(self.alignment.tolerance_ms)
    }

    pub fn track_all_businesses(&self) -> bool {
        self.tracking.scope == TrackingScope::All
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_positive_number("tracking.interval_ms", self.tracking.interval_ms, 1)?;
        validation::validate_range("tracking.min_position", self.tracking.min_position, 1, 1000)?;
        validation::validate_range(
            "tracking.max_position",
            self.tracking.max_position,
            self.tracking.min_position,
            1000,
        )?;

        if let Some(report) = &self.report {
            validation::validate_path("report.output_path", &report.output_path)?;
            ReportFormat::parse_all(&report.formats)?;
        }

        for (index, seed) in self.businesses.iter().enumerate() {
            if seed.name.trim().is_empty() || seed.domain.trim().is_empty() {
                return Err(RankError::ConfigValidationError {
                    field: format!("businesses[{}]", index),
                    message: "Business name and domain are required".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Validate for TrackerConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[tracking]
enabled = true
interval_ms = 500
min_position = 1
max_position = 50
seed = 7
scope = "all"

[alignment]
tolerance_ms = 1000

[report]
output_path = "./reports"
formats = ["csv"]

[[businesses]]
name = "Joe's Coffee Shop"
domain = "joescoffee.com"
keywords = ["best coffee shop", "local cafe near me"]
"#;

        let config = TrackerConfig::from_toml_str(toml_content).unwrap();

        assert!(config.tracking.enabled);
        assert_eq!(config.tracking_interval(), Duration::from_millis(500));
        assert_eq!(config.tracking.seed, Some(7));
        assert!(config.track_all_businesses());
        assert!(config.align_options().tolerance().is_some());
        assert_eq!(config.businesses[0].keywords.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TrackerConfig::from_toml_str("").unwrap();

        assert!(!config.tracking.enabled);
        assert_eq!(config.tracking.min_position, 1);
        assert_eq!(config.tracking.max_position, 20);
        assert_eq!(config.tracking.scope, TrackingScope::Selected);
        assert!(config.align_options().tolerance().is_none());
        assert!(config.report.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("RANK_TRACKER_TEST_DOMAIN", "smithdental.com");

        let toml_content = r#"
[[businesses]]
name = "Smith Dental Practice"
domain = "${RANK_TRACKER_TEST_DOMAIN}"
"#;

        let config = TrackerConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.businesses[0].domain, "smithdental.com");

        std::env::remove_var("RANK_TRACKER_TEST_DOMAIN");
    }

    #[test]
    fn test_config_validation() {
        let inverted = r#"
[tracking]
min_position = 30
max_position = 10
"#;
        let config = TrackerConfig::from_toml_str(inverted).unwrap();
        assert!(config.validate().is_err());

        let bad_format = r#"
[report]
output_path = "./out"
formats = ["xml"]
"#;
        let config = TrackerConfig::from_toml_str(bad_format).unwrap();
        assert!(config.validate().is_err());

        let mixed_case = r#"
[report]
output_path = "./out"
formats = ["CSV", " Json "]
"#;
        let config = TrackerConfig::from_toml_str(mixed_case).unwrap();
        assert!(config.validate().is_ok());
        let formats = ReportFormat::parse_all(&config.report.unwrap().formats).unwrap();
        assert_eq!(formats, vec![ReportFormat::Csv, ReportFormat::Json]);

        let blank_business = r#"
[[businesses]]
name = " "
domain = "a.com"
"#;
        let config = TrackerConfig::from_toml_str(blank_business).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[tracking]\nenabled = true\n")
            .unwrap();

        let config = TrackerConfig::from_file(temp_file.path()).unwrap();
        assert!(config.tracking.enabled);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = TrackerConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, RankError::ConfigError { .. }));
    }
}
