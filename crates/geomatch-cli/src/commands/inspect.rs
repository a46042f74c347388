use crate::cli::InspectArgs;
use crate::io;
use crate::output::OutputWriter;
use crate::output_types::{CoordinateStats, InspectOutput};
use anyhow::Result;
use geomatch_core::config::LayeredConfig;
use geomatch_core::store::{ColumnSpec, RecordStore};
use tabled::Tabled;

#[derive(Tabled)]
struct CoordinateRow {
    #[tabled(rename = "Coordinate")]
    column: String,
    #[tabled(rename = "Min")]
    min: String,
    #[tabled(rename = "Mean")]
    mean: String,
    #[tabled(rename = "Max")]
    max: String,
    #[tabled(rename = "Std dev")]
    std_dev: String,
}

impl From<&CoordinateStats> for CoordinateRow {
    fn from(stats: &CoordinateStats) -> Self {
        Self {
            column: stats.column.clone(),
            min: format!("{:.3}", stats.min),
            mean: format!("{:.3}", stats.mean),
            max: format!("{:.3}", stats.max),
            std_dev: format!("{:.3}", stats.std_dev),
        }
    }
}

pub fn execute(args: InspectArgs, output: &OutputWriter) -> Result<()> {
    let delimiter = io::delimiter_byte(args.delimiter)?;

    let mut config = LayeredConfig::with_defaults();
    if let Some(path) = &args.config {
        config = config.load_from_file(path)?;
    }
    let config = config.load_from_env();

    let spec = ColumnSpec::new(
        args.northing_column.unwrap_or_else(|| config.northing_column.value.clone()),
        args.easting_column.unwrap_or_else(|| config.easting_column.value.clone()),
    );

    let table = io::read_table(&args.path, delimiter)?;
    let columns = spec.resolve(&table.header)?;
    let store = RecordStore::load(table.rows, columns);

    let northings: Vec<f64> = store.iter().map(|record| record.northing()).collect();
    let eastings: Vec<f64> = store.iter().map(|record| record.easting()).collect();
    let northing_stats = describe(&spec.northing, &northings);
    let easting_stats = describe(&spec.easting, &eastings);

    if output.is_json() {
        output.result(InspectOutput {
            path: args.path.display().to_string(),
            rows: store.len(),
            skipped: store.skipped(),
            northing: northing_stats,
            easting: easting_stats,
        })?;
        return Ok(());
    }

    output.section(args.path.display().to_string());
    output.kv("Rows loaded", store.len());
    output.kv("Rows skipped", store.skipped());

    match (northing_stats, easting_stats) {
        (Some(northing), Some(easting)) => {
            output.table(vec![
                CoordinateRow::from(&northing),
                CoordinateRow::from(&easting),
            ]);
        }
        _ => output.warning("No parseable records"),
    }

    Ok(())
}

/// Per-column summary statistics over the loaded records
fn describe(column: &str, values: &[f64]) -> Option<CoordinateStats> {
    if values.is_empty() {
        return None;
    }

    let count = values.len() as f64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for &value in values {
        min = min.min(value);
        max = max.max(value);
        sum += value;
    }
    let mean = sum / count;
    let variance = values.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / count;

    Some(CoordinateStats {
        column: column.to_string(),
        min,
        mean,
        max,
        std_dev: variance.sqrt(),
    })
}
