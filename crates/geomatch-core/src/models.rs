//! Core data model: point records and match results

use geo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One georeferenced observation parsed from a tabular row.
///
/// Records are immutable once loaded; their identity is their positional
/// index within the owning [`RecordStore`](crate::store::RecordStore).
#[derive(Debug, Clone, PartialEq)]
pub struct PointRecord {
    /// Planar position, x = easting, y = northing. Both components finite.
    pub position: Point<f64>,

    /// The row's non-coordinate columns, in original order, verbatim.
    pub fields: Vec<String>,
}

impl PointRecord {
    pub fn new(position: Point<f64>, fields: Vec<String>) -> Self {
        Self { position, fields }
    }

    pub fn northing(&self) -> f64 {
        self.position.y()
    }

    pub fn easting(&self) -> f64 {
        self.position.x()
    }
}

/// How many qualifying sources are retained per target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Keep only the nearest source; distance ties go to the lowest source index
    Closest,
    /// Keep every source within the threshold
    All,
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPolicy::Closest => write!(f, "closest"),
            MatchPolicy::All => write!(f, "all"),
        }
    }
}

/// A single index hit: a source record and its exact Euclidean distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Index of the source record in the source store
    pub source: usize,

    /// Euclidean distance to the query point, strictly below the threshold
    pub distance: f64,
}

/// Outcome of matching one target record.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// A qualifying source; `distance < threshold` always holds.
    Matched { source: usize, distance: f64 },

    /// No source record within the threshold.
    NoMatch,
}

/// One entry of the match output, owned by a target record.
///
/// Under the `closest` policy there is exactly one result per target; under
/// `all` there is one per qualifying source, or a single `NoMatch` entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    /// Index of the target record in the target store
    pub target: usize,

    pub outcome: MatchOutcome,
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self.outcome, MatchOutcome::Matched { .. })
    }
}
