use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Where the save format puts things. Defaults match the Victoria 3 plaintext layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Literal string separating top-level sections.
    pub marker: String,
    /// Position of the section holding `game_date=`.
    pub metadata_section: usize,
    /// Position of the section holding the pop blocks.
    pub pops_section: usize,
    pub date_key: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            marker: "database".to_string(),
            metadata_section: 0,
            pops_section: 1,
            date_key: "game_date=".to_string(),
        }
    }
}

impl ParserConfig {
    /// Load overrides from a JSON file; absent keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ParserConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.marker.is_empty() {
            return Err(ConfigError::EmptyMarker);
        }
        if self.metadata_section == self.pops_section {
            return Err(ConfigError::SectionClash(self.pops_section));
        }
        Ok(())
    }
}

/// What the batch driver does when one document fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop the whole batch on the first failing document.
    #[default]
    Abort,
    /// Log the failure, record it in the report and carry on.
    Skip,
}

#[derive(Debug, Clone, Default)]
pub struct BatchConfig {
    pub parser: ParserConfig,
    pub on_error: ErrorPolicy,
}
