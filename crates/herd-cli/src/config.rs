//! herdmap configuration file.

use std::path::Path;

use anyhow::{Context, Result};
use herd_ingest::CsvReadOptions;
use herd_map::MatchSettings;
use serde::{Deserialize, Serialize};

/// Contents of a `--config` TOML file.
///
/// ```toml
/// [matching]
/// fuzzy_threshold = 0.9
///
/// [csv]
/// header_row = 2
/// delimiter = ";"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HerdConfig {
    pub matching: MatchSettings,
    pub csv: CsvReadOptions,
}

impl HerdConfig {
    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("parse config")?;
        config.matching.validate().context("invalid [matching] settings")?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("load config {}", path.display()))
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_use_defaults() {
        let config = HerdConfig::parse("[matching]\nfuzzy_threshold = 0.9\n").unwrap();
        assert_eq!(config.matching.fuzzy_threshold, 0.9);
        assert_eq!(config.matching.regex_score, 0.92);
        assert_eq!(config.csv, CsvReadOptions::default());
    }

    #[test]
    fn csv_section_is_read() {
        let config = HerdConfig::parse("[csv]\nheader_row = 2\ndelimiter = \";\"\n").unwrap();
        assert_eq!(config.csv.header_row, 2);
        assert_eq!(config.csv.delimiter, Some(';'));
    }

    #[test]
    fn out_of_range_scores_are_rejected() {
        assert!(HerdConfig::parse("[matching]\nexact_score = 2.0\n").is_err());
        assert!(HerdConfig::parse("[unknown]\nx = 1\n").is_err());
    }
}
