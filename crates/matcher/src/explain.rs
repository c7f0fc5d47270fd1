//! Human-readable explanations for match decisions.

use std::fmt::Write;

use crate::types::{FieldComparison, MatchOutcome, MatchScore};

/// Fields cited in the summary line.
const SUMMARY_FIELDS: usize = 3;

/// Render an explanation for a scored pair.
///
/// The first line is a summary: the outcome label plus the top
/// contributing fields in descending contribution order, limited to the
/// top three with non-zero contributions. Detail lines follow, one per
/// contributing field, naming the strategy, similarity, weight, and
/// contribution, and showing original versus normalized values when
/// normalization changed them.
pub fn explain(outcome: MatchOutcome, score: &MatchScore) -> String {
    let mut ranked: Vec<&FieldComparison> = score.field_scores.iter().collect();
    ranked.sort_by(|a, b| {
        b.contribution
            .partial_cmp(&a.contribution)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.field.cmp(&b.field))
    });

    let cited: Vec<&str> = ranked
        .iter()
        .filter(|c| c.contribution > 0.0)
        .take(SUMMARY_FIELDS)
        .map(|c| c.field.as_str())
        .collect();

    let mut text = String::new();
    if cited.is_empty() {
        let _ = write!(text, "{}", outcome.label());
    } else {
        let _ = write!(text, "{} — {}", outcome.label(), cited.join(", "));
    }
    let _ = write!(
        text,
        " (score {:.1} of {:.1})",
        score.total, score.max_possible_total
    );

    for comparison in ranked.iter().filter(|c| c.weight > 0.0) {
        let _ = write!(
            text,
            "\n  {}: {} similarity {:.2}, weight {:.0}, contribution {:.2}",
            comparison.field,
            comparison.strategy,
            comparison.similarity,
            comparison.weight,
            comparison.contribution,
        );
        if let Some(normalized) = &comparison.normalized_left_value {
            let _ = write!(
                text,
                " [left {:?} -> {:?}]",
                comparison.left_value.display_string(),
                normalized.display_string()
            );
        }
        if let Some(normalized) = &comparison.normalized_right_value {
            let _ = write!(
                text,
                " [right {:?} -> {:?}]",
                comparison.right_value.display_string(),
                normalized.display_string()
            );
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use record::FieldValue;

    fn comparison(field: &str, similarity: f64, weight: f64) -> FieldComparison {
        FieldComparison {
            field: field.to_string(),
            strategy: "exact".to_string(),
            left_value: FieldValue::Text("a".into()),
            right_value: FieldValue::Text("a".into()),
            normalized_left_value: None,
            normalized_right_value: None,
            similarity,
            weight,
            contribution: similarity * weight,
        }
    }

    fn score_of(comparisons: Vec<FieldComparison>) -> MatchScore {
        let total = comparisons.iter().map(|c| c.contribution).sum();
        let max = comparisons.iter().map(|c| c.weight).sum();
        MatchScore {
            total,
            max_possible_total: max,
            normalized: if max > 0.0 { total / max } else { 0.0 },
            field_scores: comparisons,
        }
    }

    #[test]
    fn summary_cites_top_three_by_contribution() {
        let score = score_of(vec![
            comparison("a", 1.0, 5.0),
            comparison("b", 1.0, 50.0),
            comparison("c", 1.0, 25.0),
            comparison("d", 1.0, 10.0),
            comparison("e", 0.0, 100.0),
        ]);
        let text = explain(MatchOutcome::DefiniteMatch, &score);
        let summary = text.lines().next().unwrap();
        assert!(summary.starts_with("Definite Match — b, c, d"));
        assert!(!summary.contains("b, c, d, e"));
    }

    #[test]
    fn zero_contribution_summary_has_no_field_list() {
        let score = score_of(vec![comparison("a", 0.0, 10.0)]);
        let text = explain(MatchOutcome::NoMatch, &score);
        assert!(text.starts_with("No Match (score 0.0"));
    }

    #[test]
    fn details_show_normalization_changes() {
        let mut c = comparison("email", 1.0, 50.0);
        c.left_value = FieldValue::Text("JANE@X.COM".into());
        c.normalized_left_value = Some(FieldValue::Text("jane@x.com".into()));
        let text = explain(MatchOutcome::DefiniteMatch, &score_of(vec![c]));
        assert!(text.contains("JANE@X.COM"));
        assert!(text.contains("jane@x.com"));
        assert!(text.contains("exact"));
    }
}
