//! The synchronous merge core: reconcile source records field by field
//! into a golden record with provenance.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use record::{FieldValue, Record, RecordId, SourceRecord};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{ConflictResolution, MergeConfig};
use crate::error::MergeError;
use crate::provenance::{FieldProvenance, Provenance};
use crate::strategy::MergeStrategy;

/// One reconciled disagreement between sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeConflict {
    pub field: String,
    /// Strategy that handled the field.
    pub resolution: String,
    /// The value written to the golden record (null when deferred).
    pub resolved_value: FieldValue,
    pub resolution_reason: String,
}

/// Aggregate statistics for a merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MergeStats {
    /// Fields in the union of all source records.
    pub total_fields: usize,
    pub conflicts_resolved: usize,
    pub conflicts_deferred: usize,
    /// How many golden fields each source supplied, keyed by source id.
    pub fields_from_each_source: BTreeMap<String, usize>,
}

/// Everything a merge produces.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub golden_record: Record,
    pub golden_record_id: RecordId,
    pub provenance: Provenance,
    pub conflicts: Vec<MergeConflict>,
    pub stats: MergeStats,
}

/// A non-null value gathered for one field.
struct Candidate {
    /// Index into the source slice.
    source: usize,
    value: FieldValue,
    timestamp: Option<DateTime<Utc>>,
}

/// What a strategy decided for one field.
enum Applied {
    /// One candidate's value was picked.
    Picked(usize),
    /// A value was computed from all candidates (union, average, ...).
    Computed(FieldValue),
    /// The strategy could not separate these candidates.
    Tied(Vec<usize>),
}

/// Merge source records into a golden record.
///
/// For each field in the union of source fields: select the strategy
/// (field-specific, else default), gather non-null candidates with their
/// timestamps, apply the strategy, break ties via the configured
/// conflict resolution, and record the winning source into provenance.
/// `Reject` defers tied fields: the golden record keeps no value and the
/// conflict is reported unresolved.
pub fn merge_records(
    sources: &[SourceRecord],
    config: &MergeConfig,
    golden_record_id: RecordId,
    merged_at: DateTime<Utc>,
    merged_by: Option<String>,
) -> Result<MergeOutcome, MergeError> {
    if sources.is_empty() {
        return Err(MergeError::NoSources);
    }

    let field_names: BTreeSet<&String> = sources
        .iter()
        .flat_map(|s| s.record.fields.keys())
        .collect();

    let mut golden_record = Record::new(golden_record_id.clone());
    let mut field_sources = BTreeMap::new();
    let mut conflicts = Vec::new();
    let mut stats = MergeStats {
        total_fields: field_names.len(),
        ..MergeStats::default()
    };

    for field in field_names {
        let candidates: Vec<Candidate> = sources
            .iter()
            .enumerate()
            .filter_map(|(index, source)| {
                let value = source.record.field(field);
                (!value.is_null()).then(|| Candidate {
                    source: index,
                    value: value.clone(),
                    timestamp: timestamp_of(source, config),
                })
            })
            .collect();

        if candidates.is_empty() {
            continue;
        }

        let strategy = config.strategy_for(field);
        let had_conflict = distinct_values(&candidates) > 1;

        // Agreement needs no strategy mechanics: the first source wins
        // and there is no conflict to report.
        let applied = if !had_conflict && !strategy.is_computed() {
            Applied::Picked(0)
        } else {
            apply_strategy(strategy, &candidates, sources, config)
        };

        let resolved = match applied {
            Applied::Picked(i) => Some((candidates[i].value.clone(), i, None)),
            Applied::Computed(value) => Some((value, 0, None)),
            Applied::Tied(tied) => match config.conflict_resolution {
                ConflictResolution::FirstWins => {
                    let i = tied[0];
                    Some((candidates[i].value.clone(), i, Some("tie broken first-wins")))
                }
                ConflictResolution::LastWins => {
                    let i = *tied.last().expect("tie sets are non-empty");
                    Some((candidates[i].value.clone(), i, Some("tie broken last-wins")))
                }
                ConflictResolution::UseDefault => {
                    let i = break_tie_with_default(&tied, &candidates, sources, config);
                    Some((
                        candidates[i].value.clone(),
                        i,
                        Some("tie broken by default strategy"),
                    ))
                }
                ConflictResolution::Reject => None,
            },
        };

        match resolved {
            Some((value, winner, tie_note)) => {
                let winner_id = &sources[candidates[winner].source].id;
                if had_conflict {
                    stats.conflicts_resolved += 1;
                    conflicts.push(MergeConflict {
                        field: field.clone(),
                        resolution: strategy.name().to_string(),
                        resolved_value: value.clone(),
                        resolution_reason: match tie_note {
                            Some(note) => format!("{} ({note})", strategy.name()),
                            None => format!("{} selected source {winner_id}", strategy.name()),
                        },
                    });
                }
                *stats
                    .fields_from_each_source
                    .entry(winner_id.to_string())
                    .or_insert(0) += 1;
                field_sources.insert(
                    field.clone(),
                    FieldProvenance {
                        source_record_id: winner_id.clone(),
                        strategy_applied: strategy.name().to_string(),
                        had_conflict,
                    },
                );
                golden_record.fields.insert(field.clone(), value);
            }
            None => {
                stats.conflicts_deferred += 1;
                warn!(field = field.as_str(), "conflicting field deferred by reject policy");
                conflicts.push(MergeConflict {
                    field: field.clone(),
                    resolution: strategy.name().to_string(),
                    resolved_value: FieldValue::Null,
                    resolution_reason: format!(
                        "{} tie rejected; field left unresolved",
                        strategy.name()
                    ),
                });
            }
        }
    }

    let provenance = Provenance {
        golden_record_id: golden_record_id.clone(),
        source_record_ids: sources.iter().map(|s| s.id.clone()).collect(),
        merged_at,
        merged_by,
        field_sources,
        unmerged: false,
        unmerged_at: None,
        unmerged_by: None,
        unmerge_reason: None,
        queue_item_id: None,
    };

    Ok(MergeOutcome {
        golden_record,
        golden_record_id,
        provenance,
        conflicts,
        stats,
    })
}

/// The timestamp merge strategies consult for a source: the configured
/// timestamp field when it holds an instant, else the source's
/// `updated_at`.
fn timestamp_of(source: &SourceRecord, config: &MergeConfig) -> Option<DateTime<Utc>> {
    config
        .timestamp_field
        .as_deref()
        .and_then(|field| source.record.field(field).as_timestamp())
        .or(source.updated_at)
}

fn distinct_values(candidates: &[Candidate]) -> usize {
    let mut distinct: Vec<&FieldValue> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !distinct.contains(&&candidate.value) {
            distinct.push(&candidate.value);
        }
    }
    distinct.len()
}

fn apply_strategy(
    strategy: &MergeStrategy,
    candidates: &[Candidate],
    sources: &[SourceRecord],
    config: &MergeConfig,
) -> Applied {
    match strategy {
        MergeStrategy::PreferNonNull | MergeStrategy::FirstWins => Applied::Picked(0),
        MergeStrategy::LastWins => Applied::Picked(candidates.len() - 1),
        MergeStrategy::PreferNewer => pick_by_key(candidates, |c| c.timestamp, true),
        MergeStrategy::PreferOlder => pick_by_key(candidates, |c| c.timestamp, false),
        MergeStrategy::PreferLonger => {
            pick_by_key(candidates, |c| Some(text_length(&c.value)), true)
        }
        MergeStrategy::PreferShorter => {
            pick_by_key(candidates, |c| Some(text_length(&c.value)), false)
        }
        MergeStrategy::SourcePriority => pick_by_key(
            candidates,
            |c| Some(sources[c.source].priority.unwrap_or(i32::MIN)),
            true,
        ),
        MergeStrategy::Union => Applied::Computed(union_of(candidates)),
        MergeStrategy::Intersection => Applied::Computed(intersection_of(candidates)),
        MergeStrategy::Average => Applied::Computed(average_of(candidates)),
        MergeStrategy::Custom(f) => {
            let values: Vec<FieldValue> = candidates.iter().map(|c| c.value.clone()).collect();
            Applied::Computed((f.0)(&values, sources))
        }
    }
}

/// Pick the candidate maximizing (or minimizing) a key. Candidates
/// without a key lose to candidates with one; equal keys tie.
fn pick_by_key<K: Ord + Copy>(
    candidates: &[Candidate],
    key: impl Fn(&Candidate) -> Option<K>,
    maximize: bool,
) -> Applied {
    let best = candidates
        .iter()
        .filter_map(&key)
        .reduce(|a, b| match maximize {
            true => a.max(b),
            false => a.min(b),
        });

    let Some(best) = best else {
        // No candidate carries the key (e.g. no timestamps anywhere).
        return Applied::Tied((0..candidates.len()).collect());
    };

    let tied: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| key(c) == Some(best))
        .map(|(i, _)| i)
        .collect();
    if tied.len() == 1 {
        Applied::Picked(tied[0])
    } else {
        Applied::Tied(tied)
    }
}

/// Break a tie with the default strategy; if the default ties as well
/// (or defers to a computed value), the first tied candidate wins.
fn break_tie_with_default(
    tied: &[usize],
    candidates: &[Candidate],
    sources: &[SourceRecord],
    config: &MergeConfig,
) -> usize {
    let subset: Vec<Candidate> = tied
        .iter()
        .map(|&i| Candidate {
            source: candidates[i].source,
            value: candidates[i].value.clone(),
            timestamp: candidates[i].timestamp,
        })
        .collect();
    match apply_strategy(&config.default_strategy, &subset, sources, config) {
        Applied::Picked(i) => tied[i],
        _ => tied[0],
    }
}

fn text_length(value: &FieldValue) -> usize {
    match value {
        FieldValue::Text(s) => s.chars().count(),
        other => other.display_string().chars().count(),
    }
}

/// Elements of a candidate value, viewed as a sequence.
fn elements(value: &FieldValue) -> Vec<String> {
    match value {
        FieldValue::TextList(items) => items.clone(),
        other => vec![other.display_string()],
    }
}

fn union_of(candidates: &[Candidate]) -> FieldValue {
    let mut seen = BTreeSet::new();
    let mut merged = Vec::new();
    for candidate in candidates {
        for element in elements(&candidate.value) {
            if seen.insert(element.clone()) {
                merged.push(element);
            }
        }
    }
    FieldValue::TextList(merged)
}

fn intersection_of(candidates: &[Candidate]) -> FieldValue {
    let mut iter = candidates.iter();
    let Some(first) = iter.next() else {
        return FieldValue::TextList(Vec::new());
    };
    let mut common = elements(&first.value);
    for candidate in iter {
        let present: BTreeSet<String> = elements(&candidate.value).into_iter().collect();
        common.retain(|e| present.contains(e));
    }
    common.dedup();
    FieldValue::TextList(common)
}

fn average_of(candidates: &[Candidate]) -> FieldValue {
    let numbers: Vec<f64> = candidates.iter().filter_map(|c| c.value.as_number()).collect();
    if numbers.is_empty() {
        return FieldValue::Null;
    }
    FieldValue::Number(numbers.iter().sum::<f64>() / numbers.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(seconds, 0).single().expect("timestamp")
    }

    fn source(id: &str, record: Record, updated: i64) -> SourceRecord {
        SourceRecord {
            id: RecordId::from(id),
            record,
            created_at: Some(at(0)),
            updated_at: Some(at(updated)),
            priority: None,
        }
    }

    fn merge(
        sources: &[SourceRecord],
        config: &MergeConfig,
    ) -> MergeOutcome {
        merge_records(
            sources,
            config,
            RecordId::from("golden-1"),
            at(1_000_000),
            Some("tester".into()),
        )
        .expect("merge succeeds")
    }

    #[test]
    fn empty_sources_fail() {
        let config = MergeConfig::default();
        assert!(matches!(
            merge_records(&[], &config, RecordId::from("g"), at(0), None),
            Err(MergeError::NoSources)
        ));
    }

    #[test]
    fn longer_newer_union_strategies_combine() {
        let older = source(
            "src-a",
            Record::new("a")
                .with_field("firstName", "Jon")
                .with_field("email", "jon@old.com")
                .with_field("addresses", vec!["A".to_string()]),
            100,
        );
        let newer = source(
            "src-b",
            Record::new("b")
                .with_field("firstName", "Jonathan")
                .with_field("email", "jon@new.com")
                .with_field("addresses", vec!["B".to_string()]),
            200,
        );

        let config = MergeConfig::default()
            .with_field_strategy("firstName", MergeStrategy::PreferLonger)
            .with_field_strategy("email", MergeStrategy::PreferNewer)
            .with_field_strategy("addresses", MergeStrategy::Union);

        let outcome = merge(&[older, newer], &config);
        let golden = &outcome.golden_record;
        assert_eq!(golden.field("firstName"), &FieldValue::Text("Jonathan".into()));
        assert_eq!(golden.field("email"), &FieldValue::Text("jon@new.com".into()));
        assert_eq!(
            golden.field("addresses"),
            &FieldValue::TextList(vec!["A".into(), "B".into()])
        );

        let first_name = &outcome.provenance.field_sources["firstName"];
        assert_eq!(first_name.source_record_id, RecordId::from("src-b"));
        assert_eq!(first_name.strategy_applied, "preferLonger");
        assert!(first_name.had_conflict);

        let email = &outcome.provenance.field_sources["email"];
        assert_eq!(email.source_record_id, RecordId::from("src-b"));
        assert_eq!(email.strategy_applied, "preferNewer");

        assert_eq!(outcome.stats.total_fields, 3);
        assert_eq!(outcome.stats.conflicts_resolved, 3);
        assert_eq!(outcome.stats.conflicts_deferred, 0);
    }

    #[test]
    fn prefer_non_null_takes_first_present() {
        let a = source("src-a", Record::new("a").with_field("phone", FieldValue::Null), 0);
        let b = source("src-b", Record::new("b").with_field("phone", "555-0100"), 0);
        let outcome = merge(&[a, b], &MergeConfig::default());
        assert_eq!(
            outcome.golden_record.field("phone"),
            &FieldValue::Text("555-0100".into())
        );
        assert_eq!(
            outcome.provenance.field_sources["phone"].source_record_id,
            RecordId::from("src-b")
        );
    }

    #[test]
    fn order_independent_strategies_commute() {
        let a = source(
            "src-a",
            Record::new("a")
                .with_field("tags", vec!["x".to_string(), "y".to_string()])
                .with_field("score", 10.0)
                .with_field("city", "Lisbon"),
            0,
        );
        let b = source(
            "src-b",
            Record::new("b")
                .with_field("tags", vec!["y".to_string(), "z".to_string()])
                .with_field("score", 20.0)
                .with_field("city", "Lisbon"),
            0,
        );

        let config = MergeConfig::default()
            .with_field_strategy("tags", MergeStrategy::Union)
            .with_field_strategy("score", MergeStrategy::Average);

        let ab = merge(&[a.clone(), b.clone()], &config);
        let ba = merge(&[b, a], &config);

        assert_eq!(ab.golden_record.field("score"), ba.golden_record.field("score"));
        assert_eq!(ab.golden_record.field("city"), ba.golden_record.field("city"));
        // Union is set-equal regardless of order.
        let mut left = match ab.golden_record.field("tags") {
            FieldValue::TextList(items) => items.clone(),
            other => panic!("unexpected {other:?}"),
        };
        let mut right = match ba.golden_record.field("tags") {
            FieldValue::TextList(items) => items.clone(),
            other => panic!("unexpected {other:?}"),
        };
        left.sort();
        right.sort();
        assert_eq!(left, right);
    }

    #[test]
    fn intersection_keeps_common_elements() {
        let a = source(
            "src-a",
            Record::new("a").with_field("tags", vec!["x".to_string(), "y".to_string()]),
            0,
        );
        let b = source(
            "src-b",
            Record::new("b").with_field("tags", vec!["y".to_string(), "z".to_string()]),
            0,
        );
        let config =
            MergeConfig::default().with_field_strategy("tags", MergeStrategy::Intersection);
        let outcome = merge(&[a, b], &config);
        assert_eq!(
            outcome.golden_record.field("tags"),
            &FieldValue::TextList(vec!["y".into()])
        );
    }

    #[test]
    fn source_priority_with_tie_fallback() {
        let mut a = source("src-a", Record::new("a").with_field("name", "Alpha"), 0);
        a.priority = Some(5);
        let mut b = source("src-b", Record::new("b").with_field("name", "Beta"), 0);
        b.priority = Some(9);

        let config =
            MergeConfig::default().with_field_strategy("name", MergeStrategy::SourcePriority);
        let outcome = merge(&[a.clone(), b.clone()], &config);
        assert_eq!(
            outcome.golden_record.field("name"),
            &FieldValue::Text("Beta".into())
        );

        // Equal priorities tie; last-wins resolution picks the later one.
        b.priority = Some(5);
        let config = config.with_conflict_resolution(ConflictResolution::LastWins);
        let outcome = merge(&[a, b], &config);
        assert_eq!(
            outcome.golden_record.field("name"),
            &FieldValue::Text("Beta".into())
        );
    }

    #[test]
    fn reject_defers_conflicting_fields() {
        let a = source("src-a", Record::new("a").with_field("name", "Alpha"), 100);
        let b = source("src-b", Record::new("b").with_field("name", "Beta"), 100);
        let config = MergeConfig {
            default_strategy: MergeStrategy::PreferNewer,
            conflict_resolution: ConflictResolution::Reject,
            ..MergeConfig::default()
        };
        let outcome = merge(&[a, b], &config);
        assert!(outcome.golden_record.field("name").is_null());
        assert_eq!(outcome.stats.conflicts_deferred, 1);
        assert!(!outcome.provenance.field_sources.contains_key("name"));
        assert!(outcome.conflicts[0].resolution_reason.contains("rejected"));
    }

    #[test]
    fn custom_strategy_runs() {
        let a = source("src-a", Record::new("a").with_field("name", "x"), 0);
        let b = source("src-b", Record::new("b").with_field("name", "y"), 0);
        let config = MergeConfig::default().with_field_strategy(
            "name",
            MergeStrategy::Custom(crate::strategy::MergeFn::new(|values, _| {
                FieldValue::Text(
                    values
                        .iter()
                        .map(|v| v.display_string())
                        .collect::<Vec<_>>()
                        .join("|"),
                )
            })),
        );
        let outcome = merge(&[a, b], &config);
        assert_eq!(
            outcome.golden_record.field("name"),
            &FieldValue::Text("x|y".into())
        );
    }

    #[test]
    fn timestamp_field_overrides_updated_at() {
        let a = source(
            "src-a",
            Record::new("a")
                .with_field("email", "old@example.com")
                .with_field("modifiedAt", FieldValue::Timestamp(at(900))),
            100,
        );
        let b = source(
            "src-b",
            Record::new("b")
                .with_field("email", "new@example.com")
                .with_field("modifiedAt", FieldValue::Timestamp(at(500))),
            200,
        );
        let config = MergeConfig {
            default_strategy: MergeStrategy::PreferNewer,
            timestamp_field: Some("modifiedAt".into()),
            ..MergeConfig::default()
        };
        // By updated_at src-b is newer, but the timestamp field says src-a.
        let outcome = merge(&[a, b], &config);
        assert_eq!(
            outcome.golden_record.field("email"),
            &FieldValue::Text("old@example.com".into())
        );
    }

    #[test]
    fn stats_count_fields_per_source() {
        let a = source("src-a", Record::new("a").with_field("x", "1").with_field("y", "2"), 0);
        let b = source("src-b", Record::new("b").with_field("z", "3"), 0);
        let outcome = merge(&[a, b], &MergeConfig::default());
        assert_eq!(outcome.stats.fields_from_each_source["src-a"], 2);
        assert_eq!(outcome.stats.fields_from_each_source["src-b"], 1);
    }
}
