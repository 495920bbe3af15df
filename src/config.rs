use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::parser::deserializers::DEFAULT_DATE_FORMATS;

/// Runtime settings for the loader and the report front end.
/// The filtering engine itself takes nothing but a `FilterSpec`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub delimiter: char,
    pub export_delimiter: char,
    pub top_clients: usize,
    pub date_formats: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            delimiter: ',',
            export_delimiter: ',',
            top_clients: 10,
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Input delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }

    pub fn export_delimiter_byte(&self) -> u8 {
        self.export_delimiter as u8
    }

    fn validate(&self) -> Result<(), AppError> {
        for (name, c) in [
            ("delimiter", self.delimiter),
            ("exportDelimiter", self.export_delimiter),
        ] {
            if !c.is_ascii() || c == '"' || c == '\n' || c == '\r' {
                return Err(AppError::Config(format!(
                    "{} must be a single ASCII character other than a quote or newline, got {:?}",
                    name, c
                )));
            }
        }
        if self.date_formats.is_empty() {
            return Err(AppError::Config("dateFormats must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_object() {
        let config = AppConfig::from_json("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.delimiter_byte(), b',');
        assert_eq!(config.top_clients, 10);
    }

    #[test]
    fn test_partial_override() {
        let config = AppConfig::from_json(r#"{"delimiter": ";", "topClients": 5}"#).unwrap();
        assert_eq!(config.delimiter_byte(), b';');
        assert_eq!(config.export_delimiter_byte(), b',');
        assert_eq!(config.top_clients, 5);
    }

    #[test]
    fn test_rejects_non_ascii_delimiter() {
        let err = AppConfig::from_json(r#"{"delimiter": "é"}"#).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_rejects_empty_date_formats() {
        let err = AppConfig::from_json(r#"{"dateFormats": []}"#).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load(Path::new("/nonexistent/billing-dash.json")).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
