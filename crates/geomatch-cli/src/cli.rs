use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Geomatch - spatial nearest-neighbor join for georeferenced CSV layers
#[derive(Parser, Debug)]
#[command(name = "geomatch")]
#[command(about = "Spatial nearest-neighbor join for georeferenced CSV layers", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Join source entries onto the target layer by proximity
    Join(JoinArgs),

    /// Summarize the coordinates of one layer
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
pub struct JoinArgs {
    /// CSV containing the source of georeferenced entries to be matched
    /// against target entries
    #[arg(short, long)]
    pub source: PathBuf,

    /// CSV containing the target of georeferenced entries; each target is
    /// matched against the source layer
    #[arg(short, long)]
    pub target: PathBuf,

    /// Output CSV: the target layer with the matching source entries appended
    #[arg(short, long, default_value = "matched.csv")]
    pub output: PathBuf,

    /// Maximum distance between a source and a target entry to be considered
    /// a match (same units as the coordinate columns)
    #[arg(short, long)]
    pub distance: Option<f64>,

    /// Match mode: 'closest' keeps the nearest source entry, 'all' keeps
    /// every entry within the distance
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Only append source columns whose header starts with this prefix;
    /// all source columns are appended when omitted
    #[arg(short, long)]
    pub key: Option<String>,

    /// Name of the northing column (both layers, unless overridden per layer)
    #[arg(long)]
    pub northing_column: Option<String>,

    /// Name of the easting column (both layers, unless overridden per layer)
    #[arg(long)]
    pub easting_column: Option<String>,

    /// Northing column name for the source layer only
    #[arg(long)]
    pub source_northing_column: Option<String>,

    /// Easting column name for the source layer only
    #[arg(long)]
    pub source_easting_column: Option<String>,

    /// Northing column name for the target layer only
    #[arg(long)]
    pub target_northing_column: Option<String>,

    /// Easting column name for the target layer only
    #[arg(long)]
    pub target_easting_column: Option<String>,

    /// TOML config file with column names, distance, and mode defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Field delimiter used by all CSV files
    #[arg(long, default_value = ",")]
    pub delimiter: char,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// CSV file to summarize
    pub path: PathBuf,

    /// Name of the northing column
    #[arg(long)]
    pub northing_column: Option<String>,

    /// Name of the easting column
    #[arg(long)]
    pub easting_column: Option<String>,

    /// TOML config file with column name defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Field delimiter
    #[arg(long, default_value = ",")]
    pub delimiter: char,
}
