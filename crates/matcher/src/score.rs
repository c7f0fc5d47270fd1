//! The field-pair and record-pair scorers.

use normalize::NormalizerRegistry;
use record::{Record, SchemaDefinition};

use crate::config::MatchingConfig;
use crate::types::{FieldComparison, MatchScore};

/// Score one record pair under a matching configuration.
///
/// For each configured field both sides are normalized per the schema
/// (an inline custom normalizer wins over a named one, which wins over
/// the semantic-type default), the comparator runs on the normalized
/// values, and the per-field threshold gates the contribution. Fields
/// walk in name order, so scoring is deterministic.
pub fn score_pair(
    schema: &SchemaDefinition,
    registry: &NormalizerRegistry,
    config: &MatchingConfig,
    left: &Record,
    right: &Record,
) -> MatchScore {
    let mut field_scores = Vec::with_capacity(config.fields.len());
    let mut total = 0.0;
    let mut max_possible_total = 0.0;

    for (field, field_config) in &config.fields {
        let left_value = left.field(field);
        let right_value = right.field(field);

        let (normalized_left, normalized_right) = match schema.definition(field) {
            Some(def) => (
                registry.apply_definition(def, left_value),
                registry.apply_definition(def, right_value),
            ),
            // Validation guarantees a definition; an unvalidated config
            // still scores, just without normalization.
            None => (left_value.clone(), right_value.clone()),
        };

        let similarity = field_config.strategy.compare(
            &normalized_left,
            &normalized_right,
            &field_config.compare_options(),
        );

        let gated = match field_config.threshold {
            Some(threshold) if similarity < threshold => 0.0,
            _ => similarity,
        };
        let contribution = gated * field_config.weight;

        total += contribution;
        max_possible_total += field_config.weight;

        field_scores.push(FieldComparison {
            field: field.clone(),
            strategy: field_config.strategy.name().to_string(),
            normalized_left_value: (normalized_left != *left_value).then_some(normalized_left),
            normalized_right_value: (normalized_right != *right_value).then_some(normalized_right),
            left_value: left_value.clone(),
            right_value: right_value.clone(),
            similarity,
            weight: field_config.weight,
            contribution,
        });
    }

    let normalized = if max_possible_total > 0.0 {
        total / max_possible_total
    } else {
        0.0
    };

    MatchScore {
        total,
        max_possible_total,
        normalized,
        field_scores,
    }
}
