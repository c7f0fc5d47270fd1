//! Matching configuration: per-field strategies, weights, and the global
//! decision thresholds.

use std::collections::BTreeMap;

use compare::{CompareOptions, Comparator};
use record::SchemaDefinition;
use serde::{Deserialize, Serialize};

use crate::error::MatchError;

/// How one field contributes to the record-pair score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMatchConfig {
    /// Comparator strategy for this field.
    pub strategy: Comparator,
    /// Non-negative weight; the field's contribution is
    /// `similarity * weight`.
    pub weight: f64,
    /// Optional per-field threshold in `[0, 1]`. Similarities below it
    /// contribute zero; the raw similarity is still reported in the
    /// explanation.
    #[serde(default)]
    pub threshold: Option<f64>,
    /// Compare case-sensitively. Phonetic strategies ignore this.
    #[serde(default)]
    pub case_sensitive: bool,
    /// Collapse whitespace before comparing.
    #[serde(default = "default_true")]
    pub normalize_whitespace: bool,
    /// Two nulls compare as a full match.
    #[serde(default = "default_true")]
    pub null_matches_null: bool,
}

impl FieldMatchConfig {
    /// A field compared with the given strategy and weight, with default
    /// options.
    pub fn new(strategy: Comparator, weight: f64) -> Self {
        Self {
            strategy,
            weight,
            threshold: None,
            case_sensitive: false,
            normalize_whitespace: true,
            null_matches_null: true,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    /// Comparator options implied by this field configuration.
    pub fn compare_options(&self) -> CompareOptions {
        CompareOptions {
            case_sensitive: self.case_sensitive,
            normalize_whitespace: self.normalize_whitespace,
            null_matches_null: self.null_matches_null,
        }
    }
}

fn default_true() -> bool {
    true
}

/// The two decision thresholds, applied to the raw (weighted) total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Totals below this are no-matches.
    pub no_match: f64,
    /// Totals at or above this are definite matches.
    pub definite_match: f64,
}

impl ThresholdConfig {
    pub fn new(no_match: f64, definite_match: f64) -> Self {
        Self {
            no_match,
            definite_match,
        }
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if self.no_match < 0.0 {
            return Err(MatchError::InvalidConfig(
                "no_match threshold must be >= 0".into(),
            ));
        }
        if self.no_match > self.definite_match {
            return Err(MatchError::InvalidConfig(format!(
                "thresholds inverted: no_match {} > definite_match {}",
                self.no_match, self.definite_match
            )));
        }
        Ok(())
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            no_match: 20.0,
            definite_match: 75.0,
        }
    }
}

/// Full matching configuration for an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Field name to per-field configuration.
    pub fields: BTreeMap<String, FieldMatchConfig>,
    /// Global decision thresholds.
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    /// Maximum candidates returned by a resolve call.
    #[serde(default = "MatchingConfig::default_max_results")]
    pub max_results: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self::new(ThresholdConfig::default())
    }
}

impl MatchingConfig {
    pub(crate) fn default_max_results() -> usize {
        10
    }

    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self {
            fields: BTreeMap::new(),
            thresholds,
            max_results: Self::default_max_results(),
        }
    }

    /// Consume the config, adding one field.
    pub fn with_field(mut self, name: impl Into<String>, config: FieldMatchConfig) -> Self {
        self.fields.insert(name.into(), config);
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Sum of all field weights; the maximum achievable total.
    pub fn total_weight(&self) -> f64 {
        self.fields.values().map(|f| f.weight).sum()
    }

    /// Validate the configuration against a schema.
    pub fn validate(&self, schema: &SchemaDefinition) -> Result<(), MatchError> {
        self.thresholds.validate()?;

        if self.fields.is_empty() {
            return Err(MatchError::InvalidConfig(
                "at least one field must be configured for matching".into(),
            ));
        }
        if self.max_results == 0 {
            return Err(MatchError::InvalidConfig(
                "max_results must be greater than zero".into(),
            ));
        }

        let mut any_positive = false;
        for (field, config) in &self.fields {
            if !schema.contains(field) {
                return Err(MatchError::UnknownField(field.clone()));
            }
            if !config.weight.is_finite() || config.weight < 0.0 {
                return Err(MatchError::InvalidConfig(format!(
                    "field {field:?} has negative weight {}",
                    config.weight
                )));
            }
            if config.weight > 0.0 {
                any_positive = true;
            }
            if let Some(threshold) = config.threshold {
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(MatchError::InvalidConfig(format!(
                        "field {field:?} threshold {threshold} outside [0, 1]"
                    )));
                }
            }
        }
        if !any_positive {
            return Err(MatchError::InvalidConfig(
                "at least one field must have a positive weight".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use record::FieldDefinition;

    fn schema() -> SchemaDefinition {
        SchemaDefinition::new()
            .with_field("email", FieldDefinition::text())
            .with_field("name", FieldDefinition::text())
    }

    fn base_config() -> MatchingConfig {
        MatchingConfig::new(ThresholdConfig::new(20.0, 75.0))
            .with_field("email", FieldMatchConfig::new(Comparator::Exact, 50.0))
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate(&schema()).is_ok());
    }

    #[test]
    fn unknown_field_rejected() {
        let config = base_config().with_field(
            "ssn",
            FieldMatchConfig::new(Comparator::Exact, 10.0),
        );
        assert!(matches!(
            config.validate(&schema()),
            Err(MatchError::UnknownField(f)) if f == "ssn"
        ));
    }

    #[test]
    fn negative_weight_rejected() {
        let config = base_config().with_field(
            "name",
            FieldMatchConfig::new(Comparator::Levenshtein, -1.0),
        );
        assert!(config.validate(&schema()).is_err());
    }

    #[test]
    fn all_zero_weights_rejected() {
        let config = MatchingConfig::new(ThresholdConfig::default())
            .with_field("email", FieldMatchConfig::new(Comparator::Exact, 0.0));
        assert!(config.validate(&schema()).is_err());
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let config = MatchingConfig {
            thresholds: ThresholdConfig::new(80.0, 20.0),
            ..base_config()
        };
        let err = config.validate(&schema()).expect_err("should be invalid");
        assert!(err.to_string().contains("inverted"));
    }

    #[test]
    fn per_field_threshold_range_checked() {
        let config = base_config().with_field(
            "name",
            FieldMatchConfig::new(Comparator::Levenshtein, 10.0).with_threshold(1.5),
        );
        assert!(config.validate(&schema()).is_err());
    }
}
