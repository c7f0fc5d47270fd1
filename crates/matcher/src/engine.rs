//! The match engine: resolve one record against candidates, or
//! deduplicate a whole batch.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use blocking::{generate_pairs, BlockingStrategy};
use chrono::Utc;
use normalize::NormalizerRegistry;
use record::{Record, RecordId, SchemaDefinition};
use tracing::debug;

use crate::config::MatchingConfig;
use crate::error::MatchError;
use crate::explain::explain;
use crate::score::score_pair;
use crate::types::{
    DedupeReport, MatchOutcome, MatchResult, MatchScore, PairMatch, Resolution,
};


/// Progress callback for long batch operations: `(pairs_done, pairs_total)`.
#[derive(Clone)]
pub struct ProgressFn(pub Arc<dyn Fn(usize, usize) + Send + Sync>);

impl ProgressFn {
    pub fn new(f: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for ProgressFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProgressFn(..)")
    }
}

/// Options for a batch deduplication call.
#[derive(Debug, Clone, Default)]
pub struct DedupeOptions {
    /// Soft deadline. When it passes, the call returns the pairs scored
    /// so far with `incomplete = true`.
    pub deadline: Option<Duration>,
    /// Invoked after each scored pair.
    pub progress: Option<ProgressFn>,
    /// Score pairs on the rayon pool. Requires the `parallel` feature and
    /// no deadline; the final report is deterministic either way.
    pub use_parallel: bool,
}

/// A configured, immutable matching engine.
///
/// Construction validates the whole configuration (schema references,
/// weights, thresholds, blocking strategy shapes), so a built engine
/// never fails on configuration at resolve time. The engine is
/// synchronous and shares no mutable state; calls may run concurrently
/// from multiple threads.
#[derive(Debug)]
pub struct MatchEngine {
    schema: SchemaDefinition,
    config: MatchingConfig,
    blocking: Vec<BlockingStrategy>,
    registry: Arc<NormalizerRegistry>,
}

impl MatchEngine {
    /// Build an engine, validating the configuration.
    pub fn new(
        schema: SchemaDefinition,
        config: MatchingConfig,
        blocking: Vec<BlockingStrategy>,
        registry: NormalizerRegistry,
    ) -> Result<Self, MatchError> {
        schema
            .validate()
            .map_err(|e| MatchError::InvalidConfig(e.to_string()))?;
        config.validate(&schema)?;
        for strategy in &blocking {
            strategy.validate()?;
        }
        Ok(Self {
            schema,
            config,
            blocking,
            registry: Arc::new(registry),
        })
    }

    pub fn schema(&self) -> &SchemaDefinition {
        &self.schema
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    pub fn blocking(&self) -> &[BlockingStrategy] {
        &self.blocking
    }

    /// Blocking keys for a record under the configured standard
    /// strategies (`field -> key`), including those nested in
    /// composites. Callers use these to narrow candidate fetches from a
    /// store before scoring.
    pub fn blocking_keys(&self, record: &Record) -> BTreeMap<String, String> {
        fn collect(
            strategy: &BlockingStrategy,
            record: &Record,
            keys: &mut BTreeMap<String, String>,
        ) {
            match strategy {
                BlockingStrategy::Standard { field, .. } => {
                    if let Some(key) = strategy.key_for(record) {
                        keys.insert(field.clone(), key);
                    }
                }
                BlockingStrategy::Composite { children, .. } => {
                    for child in children {
                        collect(child, record, keys);
                    }
                }
                BlockingStrategy::SortedNeighbourhood { .. } => {}
            }
        }

        let mut keys = BTreeMap::new();
        for strategy in &self.blocking {
            collect(strategy, record, &mut keys);
        }
        keys
    }

    /// Score a single record pair.
    pub fn score_pair(&self, left: &Record, right: &Record) -> MatchScore {
        score_pair(&self.schema, &self.registry, &self.config, left, right)
    }

    /// Resolve an input record against a candidate set.
    ///
    /// Every candidate is scored; results are ordered by descending total
    /// with a stable tiebreak on candidate id, then truncated to the
    /// configured `max_results`. An empty candidate set yields the `New`
    /// outcome.
    pub fn resolve(&self, input: &Record, candidates: &[Record]) -> Resolution {
        let mut results: Vec<MatchResult> = candidates
            .iter()
            .map(|candidate| {
                let started = Instant::now();
                let score = self.score_pair(input, candidate);
                let outcome = MatchOutcome::classify(score.total, &self.config.thresholds);
                let explanation = explain(outcome, &score);
                MatchResult {
                    candidate: candidate.clone(),
                    outcome,
                    score,
                    explanation,
                    processing_time_ms: started.elapsed().as_secs_f64() * 1000.0,
                    calculated_at: Utc::now(),
                }
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .total
                .partial_cmp(&a.score.total)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.candidate.id.cmp(&b.candidate.id))
        });
        results.truncate(self.config.max_results);

        let outcome = results
            .first()
            .map(|r| r.outcome)
            .unwrap_or(MatchOutcome::New);

        Resolution {
            input_id: input.id.clone(),
            results,
            outcome,
        }
    }

    /// Deduplicate a batch with default options.
    pub fn deduplicate(&self, records: &[Record]) -> Result<DedupeReport, MatchError> {
        self.deduplicate_with(records, &DedupeOptions::default())
    }

    /// Deduplicate a batch: blocking narrows the pairs, every emitted
    /// pair is scored, and records are grouped by the definite-match
    /// relation.
    pub fn deduplicate_with(
        &self,
        records: &[Record],
        opts: &DedupeOptions,
    ) -> Result<DedupeReport, MatchError> {
        let generated = generate_pairs(records, &self.blocking)?;
        let total_pairs = generated.pairs.len();
        debug!(
            records = records.len(),
            pairs = total_pairs,
            reduction = generated.stats.reduction_percentage,
            "scoring candidate pairs"
        );

        let (scored, incomplete) = self.score_pairs(records, &generated.pairs, opts);

        let mut union_find = UnionFind::new(records.len());
        let mut matches = Vec::new();
        let mut definite = 0usize;
        let mut potential = 0usize;
        let mut matched = vec![false; records.len()];

        for ((i, j), score) in scored.iter() {
            let outcome = MatchOutcome::classify(score.total, &self.config.thresholds);
            match outcome {
                MatchOutcome::DefiniteMatch => {
                    definite += 1;
                    union_find.union(*i, *j);
                }
                MatchOutcome::PotentialMatch => potential += 1,
                _ => continue,
            }
            matched[*i] = true;
            matched[*j] = true;
            matches.push(PairMatch {
                left_id: records[*i].id.clone(),
                right_id: records[*j].id.clone(),
                outcome,
                score: score.clone(),
            });
        }

        Ok(DedupeReport {
            records_processed: records.len(),
            comparisons_made: scored.len(),
            definite_matches_found: definite,
            potential_matches_found: potential,
            records_with_matches: matched.iter().filter(|&&m| m).count(),
            groups: union_find.groups(records),
            matches,
            blocking_stats: generated.stats,
            incomplete,
        })
    }

    /// Score the emitted pairs, honoring deadline and progress options.
    /// Returns the scored pairs in emission order plus the incomplete
    /// flag.
    fn score_pairs(
        &self,
        records: &[Record],
        pairs: &[(usize, usize)],
        opts: &DedupeOptions,
    ) -> (Vec<((usize, usize), MatchScore)>, bool) {
        #[cfg(feature = "parallel")]
        if opts.use_parallel && opts.deadline.is_none() {
            use rayon::prelude::*;
            use std::sync::atomic::{AtomicUsize, Ordering};

            let done = AtomicUsize::new(0);
            let scored: Vec<((usize, usize), MatchScore)> = pairs
                .par_iter()
                .map(|&(i, j)| {
                    let score = self.score_pair(&records[i], &records[j]);
                    if let Some(progress) = &opts.progress {
                        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                        (progress.0)(n, pairs.len());
                    }
                    ((i, j), score)
                })
                .collect();
            return (scored, false);
        }

        let started = Instant::now();
        let mut scored = Vec::with_capacity(pairs.len());
        for (done, &(i, j)) in pairs.iter().enumerate() {
            if let Some(deadline) = opts.deadline {
                if started.elapsed() > deadline {
                    debug!(
                        scored = done,
                        total = pairs.len(),
                        "deadline passed, returning partial result"
                    );
                    return (scored, true);
                }
            }
            scored.push(((i, j), self.score_pair(&records[i], &records[j])));
            if let Some(progress) = &opts.progress {
                (progress.0)(done + 1, pairs.len());
            }
        }
        (scored, false)
    }
}

/// Union-find over record indices, used to group definite matches.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[rb] = ra;
        }
    }

    /// Components of size two or more, as sorted id lists, sorted by
    /// their first member.
    fn groups(&mut self, records: &[Record]) -> Vec<Vec<RecordId>> {
        let mut by_root: fxhash::FxHashMap<usize, Vec<RecordId>> = fxhash::FxHashMap::default();
        for index in 0..records.len() {
            let root = self.find(index);
            by_root
                .entry(root)
                .or_default()
                .push(records[index].id.clone());
        }
        let mut groups: Vec<Vec<RecordId>> = by_root
            .into_values()
            .filter(|members| members.len() > 1)
            .map(|mut members| {
                members.sort();
                members
            })
            .collect();
        groups.sort_by(|a, b| a[0].cmp(&b[0]));
        groups
    }
}
