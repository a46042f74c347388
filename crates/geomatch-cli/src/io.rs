//! CSV reading and joined-result writing

use anyhow::{anyhow, Context, Result};
use geomatch_core::models::{MatchOutcome, MatchResult, PointRecord};
use geomatch_core::store::{RecordStore, ResolvedColumns};
use std::path::Path;

/// A parsed delimited file: header plus raw data rows
#[derive(Debug, Clone)]
pub struct CsvTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Convert the CLI delimiter argument into the byte the csv crate expects
pub fn delimiter_byte(delimiter: char) -> Result<u8> {
    u8::try_from(delimiter)
        .map_err(|_| anyhow!("Delimiter must be a single ASCII character, got '{}'", delimiter))
}

/// Read a delimited file with a header row
pub fn read_table(path: &Path, delimiter: u8) -> Result<CsvTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let header: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .iter()
        .map(|name| name.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.with_context(|| format!("Failed to read row from {}", path.display()))?;
        rows.push(record.iter().map(|field| field.to_string()).collect());
    }

    Ok(CsvTable { header, rows })
}

/// Column layout of the joined output file: the full target row, the
/// appended source columns (prefixed `source_`), and the pair distance.
pub struct JoinLayout<'a> {
    target_header: &'a [String],
    target_columns: ResolvedColumns,
    source_header: &'a [String],
    source_columns: ResolvedColumns,
    /// Source column indices selected for appending
    append: Vec<usize>,
}

impl<'a> JoinLayout<'a> {
    pub fn new(
        target_header: &'a [String],
        target_columns: ResolvedColumns,
        source_header: &'a [String],
        source_columns: ResolvedColumns,
        key: Option<&str>,
    ) -> Self {
        let append = source_header
            .iter()
            .enumerate()
            .filter(|(_, name)| key.map_or(true, |prefix| name.starts_with(prefix)))
            .map(|(index, _)| index)
            .collect();

        Self { target_header, target_columns, source_header, source_columns, append }
    }

    /// Number of source columns selected for appending
    pub fn appended_columns(&self) -> usize {
        self.append.len()
    }

    fn output_header(&self) -> Vec<String> {
        let mut header = self.target_header.to_vec();
        header.extend(
            self.append.iter().map(|&index| format!("source_{}", self.source_header[index])),
        );
        header.push("distance [m]".to_string());
        header
    }
}

/// Write one output row per match result, in result order.
///
/// No-match rows carry the target columns and empty appended cells, so the
/// row count (and order) of the output mirrors the engine's result sequence.
pub fn write_results(
    path: &Path,
    delimiter: u8,
    layout: &JoinLayout,
    targets: &RecordStore,
    sources: &RecordStore,
    results: &[MatchResult],
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(layout.output_header())?;

    for result in results {
        let target = targets
            .get(result.target)
            .with_context(|| format!("Result references unknown target {}", result.target))?;
        let mut row = reassemble_row(target, layout.target_columns);

        match result.outcome {
            MatchOutcome::Matched { source, distance } => {
                let record = sources
                    .get(source)
                    .with_context(|| format!("Result references unknown source {}", source))?;
                let source_row = reassemble_row(record, layout.source_columns);
                for &index in &layout.append {
                    row.push(source_row.get(index).cloned().unwrap_or_default());
                }
                row.push(distance.to_string());
            }
            MatchOutcome::NoMatch => {
                row.extend(std::iter::repeat(String::new()).take(layout.append.len() + 1));
            }
        }

        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Rebuild a record's original row, coordinates back in their columns
fn reassemble_row(record: &PointRecord, columns: ResolvedColumns) -> Vec<String> {
    let width = record.fields.len() + 2;
    let mut fields = record.fields.iter();

    (0..width)
        .map(|index| {
            if index == columns.northing {
                record.northing().to_string()
            } else if index == columns.easting {
                record.easting().to_string()
            } else {
                fields.next().cloned().unwrap_or_default()
            }
        })
        .collect()
}
