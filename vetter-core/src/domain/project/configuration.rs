// src/domain/project/configuration.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,

    #[serde(rename = "target-path", default = "default_target_path")]
    pub target_path: String,

    #[serde(rename = "catalog-path", default = "default_catalog_path")]
    pub catalog_path: String,

    #[serde(default)]
    pub check: CheckConfig,
}

/// Tokens and codecs the check engine works with.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq)]
pub struct CheckConfig {
    /// Sign value meaning "look the key up in the reference dataset".
    #[validate(length(min = 1, message = "Reference off-code cannot be empty"))]
    #[serde(default = "default_reference_off_code")]
    pub reference_off_code: String,

    #[validate(length(min = 1, message = "Sign separator cannot be empty"))]
    #[serde(default = "default_sign_separator")]
    pub sign_separator: String,

    #[validate(length(min = 1, message = "Range hyphen cannot be empty"))]
    #[serde(default = "default_hyphen")]
    pub hyphen: String,

    /// Placeholder written in definitions where a single space is meant.
    #[validate(length(min = 1, message = "Blank marker cannot be empty"))]
    #[serde(default = "default_blank_marker")]
    pub blank_marker: String,

    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    #[validate(length(min = 1, message = "Default extension cannot be empty"))]
    #[serde(default = "default_csv_extension")]
    pub default_csv_extension: String,

    #[validate(length(min = 1, message = "Report encoding cannot be empty"))]
    #[serde(default = "default_report_encoding")]
    pub report_encoding: String,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            reference_off_code: default_reference_off_code(),
            sign_separator: default_sign_separator(),
            hyphen: default_hyphen(),
            blank_marker: default_blank_marker(),
            delimiter: default_delimiter(),
            default_csv_extension: default_csv_extension(),
            report_encoding: default_report_encoding(),
        }
    }
}

fn default_target_path() -> String {
    "target".to_string()
}
fn default_catalog_path() -> String {
    "catalog".to_string()
}
fn default_reference_off_code() -> String {
    "@REF".to_string()
}
fn default_sign_separator() -> String {
    ",".to_string()
}
fn default_hyphen() -> String {
    "-".to_string()
}
fn default_blank_marker() -> String {
    "△".to_string()
}
fn default_delimiter() -> char {
    ','
}
fn default_csv_extension() -> String {
    "csv".to_string()
}
fn default_report_encoding() -> String {
    "utf-8".to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_project_uses_defaults() {
        let config: ProjectConfig = serde_yaml::from_str("name: demo\nversion: '1.0'\n").unwrap();

        assert_eq!(config.target_path, "target");
        assert_eq!(config.catalog_path, "catalog");
        assert_eq!(config.check, CheckConfig::default());
        assert!(config.check.validate().is_ok());
    }

    #[test]
    fn test_empty_separator_is_rejected() {
        let yaml = "name: demo\nversion: '1.0'\ncheck:\n  sign_separator: ''\n";
        let config: ProjectConfig = serde_yaml::from_str(yaml).unwrap();

        assert!(config.check.validate().is_err());
    }
}
