use geomatch_core::engine::MatchStats;
use serde::Serialize;

/// Output for the join command
#[derive(Debug, Serialize)]
pub struct JoinOutput {
    pub output_path: String,
    pub source_rows: usize,
    pub source_skipped: usize,
    pub target_rows: usize,
    pub target_skipped: usize,
    pub stats: MatchStats,
}

/// Output for the inspect command
#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub path: String,
    pub rows: usize,
    pub skipped: usize,
    pub northing: Option<CoordinateStats>,
    pub easting: Option<CoordinateStats>,
}

/// Summary statistics for one coordinate column
#[derive(Debug, Clone, Serialize)]
pub struct CoordinateStats {
    pub column: String,
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    pub std_dev: f64,
}
