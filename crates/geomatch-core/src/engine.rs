//! Match engine: joins every target record to its qualifying sources

use crate::config::MatchConfig;
use crate::error::Result;
use crate::index::SpatialIndex;
use crate::models::{MatchOutcome, MatchPolicy, MatchResult};
use crate::store::RecordStore;
use serde::Serialize;

/// Counters reported after a matching run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    /// Target records processed
    pub targets: usize,

    /// Targets with at least one qualifying source
    pub matched_targets: usize,

    /// Targets with an empty match set
    pub unmatched_targets: usize,

    /// Total (target, source) pairs emitted
    pub pairs: usize,
}

/// Results and diagnostics of one matching run
#[derive(Debug)]
pub struct MatchReport {
    /// One entry per target in `closest` mode, one per qualifying pair in
    /// `all` mode; target input order is preserved either way.
    pub results: Vec<MatchResult>,

    pub stats: MatchStats,
}

/// Match every target against the indexed sources, in target order.
///
/// Fails fast on an invalid configuration; no partial output is produced.
pub fn match_all(
    targets: &RecordStore,
    index: &SpatialIndex,
    config: &MatchConfig,
) -> Result<MatchReport> {
    match_all_with_progress(targets, index, config, |_, _| {})
}

/// Match with a progress callback, invoked as `(processed, total)` after
/// each target.
pub fn match_all_with_progress<F>(
    targets: &RecordStore,
    index: &SpatialIndex,
    config: &MatchConfig,
    mut progress: F,
) -> Result<MatchReport>
where
    F: FnMut(usize, usize),
{
    config.validate()?;

    let total = targets.len();
    let mut results = Vec::with_capacity(total);
    let mut stats = MatchStats { targets: total, ..MatchStats::default() };

    for (target, record) in targets.iter().enumerate() {
        let neighbors = index.query(record.position, config.threshold);

        if neighbors.is_empty() {
            tracing::debug!("No match within {} for target {}", config.threshold, target);
            stats.unmatched_targets += 1;
            results.push(MatchResult { target, outcome: MatchOutcome::NoMatch });
            progress(target + 1, total);
            continue;
        }

        stats.matched_targets += 1;

        match config.policy {
            MatchPolicy::Closest => {
                // Candidates arrive in ascending id order; keeping the first
                // strict minimum resolves distance ties to the lowest id.
                let mut best = neighbors[0];
                for neighbor in &neighbors[1..] {
                    if neighbor.distance < best.distance {
                        best = *neighbor;
                    }
                }

                stats.pairs += 1;
                results.push(MatchResult {
                    target,
                    outcome: MatchOutcome::Matched { source: best.source, distance: best.distance },
                });
            }
            MatchPolicy::All => {
                stats.pairs += neighbors.len();
                for neighbor in neighbors {
                    results.push(MatchResult {
                        target,
                        outcome: MatchOutcome::Matched {
                            source: neighbor.source,
                            distance: neighbor.distance,
                        },
                    });
                }
            }
        }

        progress(target + 1, total);
    }

    Ok(MatchReport { results, stats })
}
