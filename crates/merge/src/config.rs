//! Merge configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::strategy::MergeStrategy;

/// How a tie between candidate values is broken after the strategy has
/// had its say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ConflictResolution {
    /// Fall back to the default strategy (or first-wins when the tie
    /// arose under the default itself).
    #[default]
    UseDefault,
    /// First tied candidate in source order wins.
    FirstWins,
    /// Last tied candidate in source order wins.
    LastWins,
    /// Defer the field: the golden record keeps null and the conflict is
    /// reported unresolved.
    Reject,
}

/// Configuration for a merge run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Strategy for fields without a field-specific entry.
    #[serde(default)]
    pub default_strategy: MergeStrategy,
    /// Per-field strategy overrides.
    #[serde(default)]
    pub field_strategies: BTreeMap<String, MergeStrategy>,
    /// Record field consulted by `preferNewer`/`preferOlder` before
    /// falling back to the source's `updated_at`.
    #[serde(default)]
    pub timestamp_field: Option<String>,
    /// Tie-breaking policy.
    #[serde(default)]
    pub conflict_resolution: ConflictResolution,
    /// Persist provenance through the provenance store. On by default.
    #[serde(default = "default_true")]
    pub track_provenance: bool,
}

fn default_true() -> bool {
    true
}

impl MergeConfig {
    pub fn new(default_strategy: MergeStrategy) -> Self {
        Self {
            default_strategy,
            ..Self::default()
        }
    }

    /// Consume the config, adding one field strategy.
    pub fn with_field_strategy(
        mut self,
        field: impl Into<String>,
        strategy: MergeStrategy,
    ) -> Self {
        self.field_strategies.insert(field.into(), strategy);
        self
    }

    pub fn with_timestamp_field(mut self, field: impl Into<String>) -> Self {
        self.timestamp_field = Some(field.into());
        self
    }

    pub fn with_conflict_resolution(mut self, resolution: ConflictResolution) -> Self {
        self.conflict_resolution = resolution;
        self
    }

    /// Strategy in force for a field.
    pub fn strategy_for(&self, field: &str) -> &MergeStrategy {
        self.field_strategies
            .get(field)
            .unwrap_or(&self.default_strategy)
    }
}
