//! Candidate-pair generation and blocking statistics.

use fxhash::{FxHashMap, FxHashSet};
use record::Record;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::BlockingError;
use crate::strategy::{BlockingStrategy, CompositeMode};

/// Observability statistics for one blocking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BlockingStats {
    /// Records fed into blocking.
    pub total_records: usize,
    /// Number of non-empty blocks formed by standard strategies.
    pub block_count: usize,
    /// Size of the largest block.
    pub largest_block: usize,
    /// Pairs emitted after deduplication.
    pub pairs_with_blocking: usize,
    /// Pairs a full pairwise comparison would produce: `n * (n-1) / 2`.
    pub pairs_without_blocking: usize,
    /// `1 - with / without`, as a percentage in `[0, 100]`.
    pub reduction_percentage: f64,
}

/// The outcome of a blocking run: deduplicated, ordered candidate pairs
/// (indices into the input slice, `left < right`) plus statistics.
#[derive(Debug, Clone, Default)]
pub struct CandidatePairs {
    pub pairs: Vec<(usize, usize)>,
    pub stats: BlockingStats,
}

/// Generate candidate pairs for a record slice.
///
/// The strategy list is a union: a pair is scored when any listed
/// strategy emits it. An empty list falls back to full pairwise
/// generation: quadratic, acceptable for small batches. Self-pairs are
/// never emitted and the output ordering is deterministic.
pub fn generate_pairs(
    records: &[Record],
    strategies: &[BlockingStrategy],
) -> Result<CandidatePairs, BlockingError> {
    for strategy in strategies {
        strategy.validate()?;
    }

    let n = records.len();
    let mut collector = BlockCollector::default();

    let set: FxHashSet<(usize, usize)> = if strategies.is_empty() {
        let mut all = FxHashSet::default();
        for i in 0..n {
            for j in (i + 1)..n {
                all.insert((i, j));
            }
        }
        all
    } else {
        let mut union = FxHashSet::default();
        for strategy in strategies {
            union.extend(pairs_for(strategy, records, &mut collector));
        }
        union
    };

    let mut pairs: Vec<(usize, usize)> = set.into_iter().collect();
    pairs.sort_unstable();

    let pairs_without_blocking = n * n.saturating_sub(1) / 2;
    let reduction_percentage = if pairs_without_blocking == 0 {
        0.0
    } else {
        (1.0 - pairs.len() as f64 / pairs_without_blocking as f64) * 100.0
    };

    Ok(CandidatePairs {
        stats: BlockingStats {
            total_records: n,
            block_count: collector.block_count,
            largest_block: collector.largest_block,
            pairs_with_blocking: pairs.len(),
            pairs_without_blocking,
            reduction_percentage,
        },
        pairs,
    })
}

#[derive(Default)]
struct BlockCollector {
    block_count: usize,
    largest_block: usize,
}

impl BlockCollector {
    fn observe(&mut self, size: usize) {
        self.block_count += 1;
        self.largest_block = self.largest_block.max(size);
    }
}

fn pairs_for(
    strategy: &BlockingStrategy,
    records: &[Record],
    collector: &mut BlockCollector,
) -> FxHashSet<(usize, usize)> {
    match strategy {
        BlockingStrategy::Standard { max_block_size, .. } => {
            standard_pairs(strategy, records, *max_block_size, collector)
        }
        BlockingStrategy::SortedNeighbourhood { field, window } => {
            neighbourhood_pairs(field, *window, records)
        }
        BlockingStrategy::Composite { children, mode } => {
            let mut iter = children.iter();
            let mut set = iter
                .next()
                .map(|child| pairs_for(child, records, collector))
                .unwrap_or_default();
            for child in iter {
                let next = pairs_for(child, records, collector);
                match mode {
                    CompositeMode::Union => set.extend(next),
                    CompositeMode::Intersection => set.retain(|pair| next.contains(pair)),
                }
            }
            set
        }
    }
}

fn standard_pairs(
    strategy: &BlockingStrategy,
    records: &[Record],
    max_block_size: Option<usize>,
    collector: &mut BlockCollector,
) -> FxHashSet<(usize, usize)> {
    let mut blocks: FxHashMap<String, Vec<usize>> = FxHashMap::default();
    for (index, record) in records.iter().enumerate() {
        // Null keys exclude the record from this strategy entirely.
        if let Some(key) = strategy.key_for(record) {
            blocks.entry(key).or_default().push(index);
        }
    }

    let mut pairs = FxHashSet::default();
    for (key, members) in &blocks {
        collector.observe(members.len());
        if let Some(cap) = max_block_size {
            if members.len() > cap {
                warn!(
                    key = key.as_str(),
                    size = members.len(),
                    cap,
                    "dropping oversized block"
                );
                continue;
            }
        }
        for (a, &i) in members.iter().enumerate() {
            for &j in &members[a + 1..] {
                pairs.insert(ordered(i, j));
            }
        }
    }
    pairs
}

fn neighbourhood_pairs(field: &str, window: usize, records: &[Record]) -> FxHashSet<(usize, usize)> {
    // Records without a sort key cannot participate in this strategy.
    let mut keyed: Vec<(String, usize)> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.field(field).is_null())
        .map(|(i, r)| (r.field(field).display_string(), i))
        .collect();
    // Stable by construction: equal keys keep input order via the index.
    keyed.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

    let reach = window / 2;
    let mut pairs = FxHashSet::default();
    for (pos, (_, i)) in keyed.iter().enumerate() {
        for (_, j) in keyed.iter().skip(pos + 1).take(reach) {
            pairs.insert(ordered(*i, *j));
        }
    }
    pairs
}

fn ordered(i: usize, j: usize) -> (usize, usize) {
    if i < j {
        (i, j)
    } else {
        (j, i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::KeyTransform;
    use record::Record;

    fn person(id: i64, last: &str, year: i64) -> Record {
        Record::new(id)
            .with_field("lastName", last)
            .with_field("birthYear", year)
    }

    #[test]
    fn standard_blocking_groups_by_key() {
        let records = vec![
            person(1, "Smith", 1990),
            person(2, "Smith", 1985),
            person(3, "Jones", 1990),
        ];
        let out = generate_pairs(&records, &[BlockingStrategy::standard("lastName")]).unwrap();
        assert_eq!(out.pairs, vec![(0, 1)]);
        assert_eq!(out.stats.block_count, 2);
        assert_eq!(out.stats.largest_block, 2);
        assert_eq!(out.stats.pairs_without_blocking, 3);
    }

    #[test]
    fn null_keys_are_excluded() {
        let records = vec![
            person(1, "Smith", 1990),
            Record::new(2).with_field("birthYear", 1990i64),
            person(3, "Smith", 1991),
        ];
        let out = generate_pairs(&records, &[BlockingStrategy::standard("lastName")]).unwrap();
        assert_eq!(out.pairs, vec![(0, 2)]);
    }

    #[test]
    fn no_strategies_means_full_pairwise() {
        let records = vec![
            person(1, "a", 1),
            person(2, "b", 2),
            person(3, "c", 3),
        ];
        let out = generate_pairs(&records, &[]).unwrap();
        assert_eq!(out.pairs, vec![(0, 1), (0, 2), (1, 2)]);
        assert_eq!(out.stats.reduction_percentage, 0.0);
    }

    #[test]
    fn oversized_blocks_are_dropped() {
        let records = vec![
            person(1, "Smith", 1990),
            person(2, "Smith", 1991),
            person(3, "Smith", 1992),
            person(4, "Jones", 1990),
            person(5, "Jones", 1991),
        ];
        let strategy = BlockingStrategy::Standard {
            field: "lastName".into(),
            transform: None,
            max_block_size: Some(2),
        };
        let out = generate_pairs(&records, &[strategy]).unwrap();
        // The three-Smith block is dropped; only the Jones pair survives.
        assert_eq!(out.pairs, vec![(3, 4)]);
    }

    #[test]
    fn sorted_neighbourhood_window() {
        let records = vec![
            person(1, "adams", 0),
            person(2, "baker", 0),
            person(3, "clark", 0),
            person(4, "davis", 0),
        ];
        let out = generate_pairs(
            &records,
            &[BlockingStrategy::sorted_neighbourhood("lastName", 3)],
        )
        .unwrap();
        // Window 3: each record pairs with neighbours within one position.
        assert_eq!(out.pairs, vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn composite_union_covers_both_keys() {
        let records = vec![
            person(1, "Smith", 1990),
            person(2, "Smith", 1985),
            person(3, "Jones", 1990),
            person(4, "Brown", 1975),
        ];
        let strategy = BlockingStrategy::union(vec![
            BlockingStrategy::standard_with("lastName", KeyTransform::Soundex),
            BlockingStrategy::standard_with("birthYear", KeyTransform::Year),
        ]);
        let out = generate_pairs(&records, &[strategy]).unwrap();
        // Record 1 co-blocks with 2 (surname) and 3 (year); 4 is isolated.
        assert_eq!(out.pairs, vec![(0, 1), (0, 2)]);
    }

    #[test]
    fn composite_intersection_requires_all_children() {
        let records = vec![
            person(1, "Smith", 1990),
            person(2, "Smith", 1990),
            person(3, "Smith", 1985),
        ];
        let strategy = BlockingStrategy::intersection(vec![
            BlockingStrategy::standard("lastName"),
            BlockingStrategy::standard("birthYear"),
        ]);
        let out = generate_pairs(&records, &[strategy]).unwrap();
        assert_eq!(out.pairs, vec![(0, 1)]);
    }

    #[test]
    fn reduction_percentage_reflects_savings() {
        let mut records = Vec::new();
        for i in 0..20 {
            records.push(person(i, if i % 2 == 0 { "even" } else { "odd" }, i));
        }
        let out = generate_pairs(&records, &[BlockingStrategy::standard("lastName")]).unwrap();
        assert_eq!(out.stats.pairs_without_blocking, 190);
        assert_eq!(out.stats.pairs_with_blocking, 90);
        assert!(out.stats.reduction_percentage > 50.0);
    }
}
