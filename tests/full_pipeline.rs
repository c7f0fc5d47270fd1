use std::sync::Arc;

use reclink::{
    BlockingStrategy, Comparator, ConflictResolution, EngineBuilder, FieldDefinition,
    FieldMatchConfig, FieldValue, InMemoryArchive, InMemoryProvenanceStore, KeyTransform,
    MatchOutcome, MergeConfig, MergeStrategy, ProvenanceStore, Record, RecordId, SemanticType,
    SequentialIdGenerator, SourceRecord, SourceRecordArchive, UnmergeError,
};

fn customer_engine() -> reclink::ReclinkEngine {
    EngineBuilder::new()
        .schema_field("email", FieldDefinition::of_type(SemanticType::Email).required())
        .schema_field("firstName", FieldDefinition::of_type(SemanticType::Name))
        .schema_field("lastName", FieldDefinition::of_type(SemanticType::Name))
        .match_field("email", FieldMatchConfig::new(Comparator::Exact, 50.0))
        .match_field("firstName", FieldMatchConfig::new(Comparator::Exact, 25.0))
        .match_field("lastName", FieldMatchConfig::new(Comparator::Exact, 25.0))
        .thresholds(20.0, 75.0)
        .merge(
            MergeConfig::default()
                .with_field_strategy("firstName", MergeStrategy::PreferLonger)
                .with_field_strategy("email", MergeStrategy::PreferNewer)
                .with_field_strategy("addresses", MergeStrategy::Union)
                .with_conflict_resolution(ConflictResolution::UseDefault),
        )
        .build()
        .expect("engine builds")
}

fn jane(id: &str) -> Record {
    Record::new(id)
        .with_field("email", "jane.smith@example.com")
        .with_field("firstName", "Jane")
        .with_field("lastName", "Smith")
}

#[test]
fn exact_email_match_is_definite() {
    let engine = customer_engine();
    let resolution = engine.matcher().resolve(&jane("input"), &[jane("cust-1")]);

    assert_eq!(resolution.outcome, MatchOutcome::DefiniteMatch);
    let best = resolution.best().expect("one candidate");
    assert_eq!(best.score.total, 100.0);
    assert_eq!(best.score.normalized, 1.0);
    assert!(best.explanation.contains("email"));
}

#[test]
fn blocking_restricts_scored_pairs() {
    let engine = EngineBuilder::new()
        .schema_field("lastName", FieldDefinition::of_type(SemanticType::Name))
        .schema_field("birthYear", FieldDefinition::of_type(SemanticType::Number))
        .match_field("lastName", FieldMatchConfig::new(Comparator::jaro_winkler(), 100.0))
        .thresholds(20.0, 75.0)
        .blocking(BlockingStrategy::union(vec![
            BlockingStrategy::standard_with("lastName", KeyTransform::Soundex),
            BlockingStrategy::standard_with("birthYear", KeyTransform::Year),
        ]))
        .build()
        .expect("engine builds");

    let records = vec![
        Record::new(1).with_field("lastName", "Smith").with_field("birthYear", 1990i64),
        Record::new(2).with_field("lastName", "Smith").with_field("birthYear", 1985i64),
        Record::new(3).with_field("lastName", "Jones").with_field("birthYear", 1990i64),
        Record::new(4).with_field("lastName", "Brown").with_field("birthYear", 1975i64),
    ];
    let report = engine.matcher().deduplicate(&records).expect("dedupe");

    // Record 1 co-blocks with 2 (surname) and 3 (year); record 4 is
    // isolated, so exactly two pairs are scored.
    assert_eq!(report.comparisons_made, 2);
    assert!(report.blocking_stats.reduction_percentage > 0.0);
}

#[tokio::test]
async fn merge_then_unmerge_round_trips() {
    let engine = customer_engine();
    let store = Arc::new(InMemoryProvenanceStore::new());
    let archive = Arc::new(InMemoryArchive::new());
    let executor = engine
        .merge_executor(
            Arc::clone(&store) as Arc<dyn ProvenanceStore>,
            Arc::clone(&archive) as Arc<dyn SourceRecordArchive>,
        )
        .with_id_generator(Arc::new(SequentialIdGenerator::new("golden")))
        .with_merged_by("pipeline-test");

    let t0 = "2024-01-01T00:00:00Z".parse().expect("timestamp");
    let t1 = "2024-06-01T00:00:00Z".parse().expect("timestamp");
    let sources = vec![
        SourceRecord::from_record(
            Record::new("s1")
                .with_field("firstName", "Jon")
                .with_field("email", "jon@old.com")
                .with_field("addresses", vec!["A".to_string()]),
        )
        .with_updated_at(t0),
        SourceRecord::from_record(
            Record::new("s2")
                .with_field("firstName", "Jonathan")
                .with_field("email", "jon@new.com")
                .with_field("addresses", vec!["B".to_string()]),
        )
        .with_updated_at(t1),
    ];

    let outcome = executor.merge(sources.clone()).await.expect("merge");
    let golden = &outcome.golden_record;
    assert_eq!(golden.field("firstName"), &FieldValue::Text("Jonathan".into()));
    assert_eq!(golden.field("email"), &FieldValue::Text("jon@new.com".into()));
    assert_eq!(
        golden.field("addresses"),
        &FieldValue::TextList(vec!["A".into(), "B".into()])
    );

    // Provenance names strategy and source per field.
    let email = &outcome.provenance.field_sources["email"];
    assert_eq!(email.strategy_applied, "preferNewer");
    assert_eq!(email.source_record_id, RecordId::from("s2"));
    assert!(email.had_conflict);

    // Unmerge restores the exact source records.
    let unmerged = executor
        .unmerge(&outcome.golden_record_id, None, Some("test rollback".into()))
        .await
        .expect("unmerge");
    assert_eq!(unmerged.restored_records, sources);

    // And a second unmerge fails.
    let err = executor
        .unmerge(&outcome.golden_record_id, None, None)
        .await
        .expect_err("double unmerge");
    assert!(matches!(err, UnmergeError::AlreadyUnmerged(_)));
}

#[test]
fn missing_optional_field_tolerance() {
    let engine = EngineBuilder::new()
        .schema_field("email", FieldDefinition::of_type(SemanticType::Email))
        .schema_field("nickname", FieldDefinition::text())
        .match_field("email", FieldMatchConfig::new(Comparator::Exact, 50.0))
        .match_field("nickname", FieldMatchConfig::new(Comparator::Exact, 50.0))
        .thresholds(20.0, 75.0)
        .build()
        .expect("engine builds");

    // Absent on both sides: counts as a match under nullMatchesNull.
    let a = Record::new(1).with_field("email", "a@x.com");
    let b = Record::new(2).with_field("email", "a@x.com");
    let score = engine.matcher().score_pair(&a, &b);
    assert_eq!(score.total, 100.0);

    // Absent on one side only: that field contributes zero.
    let c = Record::new(3)
        .with_field("email", "a@x.com")
        .with_field("nickname", "Ace");
    let score = engine.matcher().score_pair(&a, &c);
    assert_eq!(score.total, 50.0);
}
