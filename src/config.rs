//! YAML configuration file support.
//!
//! A whole pipeline (schema, matching, thresholds, blocking, merge)
//! can be described in one YAML document and loaded at runtime:
//!
//! ```yaml
//! version: "1.0"
//! name: "customer-dedupe"
//!
//! schema:
//!   email:     { type: email, required: true }
//!   firstName: { type: name }
//!   lastName:  { type: name, component: last }
//!   birthDate: { type: date }
//!
//! matching:
//!   fields:
//!     email:     { strategy: exact, weight: 50 }
//!     firstName: { strategy: jaro-winkler, weight: 25, threshold: 0.85 }
//!     lastName:  { strategy: soundex, weight: 25 }
//!   thresholds: { no_match: 20, definite_match: 75 }
//!   max_results: 10
//!
//! blocking:
//!   - { type: standard, field: lastName, transform: soundex }
//!   - { type: sorted-neighbourhood, field: birthDate, window: 5 }
//!
//! merge:
//!   default_strategy: preferNonNull
//!   field_strategies:
//!     firstName: preferLonger
//!     email: preferNewer
//!   conflict_resolution: useDefault
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use blocking::BlockingStrategy;
use compare::Comparator;
use matcher::FieldMatchConfig;
use merge::MergeConfig;
use record::FieldDefinition;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::builder::{EngineBuilder, ReclinkEngine};
use crate::error::ReclinkError;

/// Errors that can occur when loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("unsupported config version: {0:?}")]
    UnsupportedVersion(String),

    #[error("validation error: {0}")]
    Validation(String),
}

impl From<ReclinkError> for ConfigLoadError {
    fn from(e: ReclinkError) -> Self {
        ConfigLoadError::Validation(e.to_string())
    }
}

/// Top-level YAML configuration for a resolution pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReclinkConfig {
    /// Configuration format version; `"1"` and `"1.0"` are accepted.
    pub version: String,

    /// Optional configuration name.
    #[serde(default)]
    pub name: Option<String>,

    /// Schema section: field name to definition.
    #[serde(default)]
    pub schema: BTreeMap<String, FieldDefinition>,

    /// Matching section.
    #[serde(default)]
    pub matching: MatchingSection,

    /// Blocking strategies, evaluated as a union.
    #[serde(default)]
    pub blocking: Vec<BlockingStrategy>,

    /// Merge section.
    #[serde(default)]
    pub merge: MergeConfig,
}

/// The `matching:` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MatchingSection {
    #[serde(default)]
    pub fields: BTreeMap<String, MatchFieldSection>,
    #[serde(default)]
    pub thresholds: ThresholdSection,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

/// One field under `matching.fields`. The strategy is an external name
/// so config files stay flat; it resolves when the engine is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchFieldSection {
    pub strategy: String,
    pub weight: f64,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default = "default_true")]
    pub normalize_whitespace: bool,
}

/// The `matching.thresholds` section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThresholdSection {
    pub no_match: f64,
    pub definite_match: f64,
}

impl Default for ThresholdSection {
    fn default() -> Self {
        Self {
            no_match: 20.0,
            definite_match: 75.0,
        }
    }
}

fn default_max_results() -> usize {
    10
}

fn default_true() -> bool {
    true
}

impl ReclinkConfig {
    /// Load a YAML configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Parse a YAML configuration from a string.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigLoadError> {
        let config: ReclinkConfig = serde_yaml::from_str(text)?;
        config.check_version()?;
        Ok(config)
    }

    fn check_version(&self) -> Result<(), ConfigLoadError> {
        match self.version.trim() {
            "1" | "1.0" => Ok(()),
            other => Err(ConfigLoadError::UnsupportedVersion(other.to_string())),
        }
    }

    /// Convert into a builder, resolving strategy names.
    pub fn into_builder(self) -> Result<EngineBuilder, ConfigLoadError> {
        let mut builder = EngineBuilder::new()
            .thresholds(
                self.matching.thresholds.no_match,
                self.matching.thresholds.definite_match,
            )
            .max_results(self.matching.max_results)
            .merge(self.merge);

        for (name, def) in self.schema {
            builder = builder.schema_field(name, def);
        }
        for (name, field) in self.matching.fields {
            let comparator = Comparator::from_name(&field.strategy).map_err(|e| {
                ConfigLoadError::Validation(format!("match field {name:?}: {e}"))
            })?;
            let mut config = FieldMatchConfig::new(comparator, field.weight);
            config.threshold = field.threshold;
            config.case_sensitive = field.case_sensitive;
            config.normalize_whitespace = field.normalize_whitespace;
            builder = builder.match_field(name, config);
        }
        for strategy in self.blocking {
            builder = builder.blocking(strategy);
        }
        Ok(builder)
    }

    /// Build the engine directly.
    pub fn build_engine(self) -> Result<ReclinkEngine, ConfigLoadError> {
        Ok(self.into_builder()?.build()?)
    }
}
