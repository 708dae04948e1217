//! Configuration structures for the scanin pipeline.

use serde::{Deserialize, Serialize};

use crate::error::ScaninError;
use crate::models::invoice::Currency;

/// Main configuration for the scanin pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaninConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Currency used when the document gives no usable signal.
    pub default_currency: Currency,

    /// Sort lines top-to-bottom before running the resolvers.
    pub sort_by_position: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            default_currency: Currency::Eur,
            sort_by_position: true,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Include the concatenated OCR text alongside the record.
    pub include_raw_text: bool,

    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl ScaninConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| ScaninError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ScaninConfig =
            serde_json::from_str(r#"{"extraction": {"default_currency": "USD"}}"#).unwrap();

        assert_eq!(config.extraction.default_currency, Currency::Usd);
        assert!(config.extraction.sort_by_position);
        assert!(!config.output.include_raw_text);
    }

    #[test]
    fn test_rejects_unsupported_currency() {
        let result: Result<ScaninConfig, _> =
            serde_json::from_str(r#"{"extraction": {"default_currency": "JPY"}}"#);
        assert!(result.is_err());
    }
}
