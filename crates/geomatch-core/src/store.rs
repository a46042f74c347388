//! Immutable record collections loaded from tabular rows

use crate::error::{GeomatchError, Result};
use crate::models::PointRecord;
use geo::Point;

/// Column names designating the coordinate pair of one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub northing: String,
    pub easting: String,
}

impl ColumnSpec {
    pub fn new(northing: impl Into<String>, easting: impl Into<String>) -> Self {
        Self {
            northing: northing.into(),
            easting: easting.into(),
        }
    }

    /// Resolve the configured names against a header row.
    ///
    /// Missing columns are a configuration error, detected before any row
    /// is loaded.
    pub fn resolve(&self, header: &[String]) -> Result<ResolvedColumns> {
        let northing = header
            .iter()
            .position(|name| name == &self.northing)
            .ok_or_else(|| GeomatchError::ColumnNotFound { column: self.northing.clone() })?;
        let easting = header
            .iter()
            .position(|name| name == &self.easting)
            .ok_or_else(|| GeomatchError::ColumnNotFound { column: self.easting.clone() })?;

        if northing == easting {
            return Err(GeomatchError::ConfigInvalid {
                key: "columns".to_string(),
                reason: format!(
                    "northing and easting resolve to the same column '{}'",
                    self.northing
                ),
            });
        }

        Ok(ResolvedColumns { northing, easting })
    }
}

/// Coordinate column indices after header resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub northing: usize,
    pub easting: usize,
}

/// Immutable collection of point records for one input layer.
///
/// Rows that cannot be parsed into a record are skipped, counted, and
/// reported through [`skipped`](RecordStore::skipped); loading never aborts
/// on a malformed row.
#[derive(Debug, Default)]
pub struct RecordStore {
    records: Vec<PointRecord>,
    skipped: usize,
}

impl RecordStore {
    /// Load parsed tabular rows into an immutable record collection.
    pub fn load<R>(rows: R, columns: ResolvedColumns) -> Self
    where
        R: IntoIterator<Item = Vec<String>>,
    {
        let mut records = Vec::new();
        let mut skipped = 0;

        for (row, fields) in rows.into_iter().enumerate() {
            match parse_row(&fields, columns, row) {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!("Skipping row: {}", err);
                    skipped += 1;
                }
            }
        }

        Self { records, skipped }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PointRecord> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PointRecord> {
        self.records.iter()
    }

    /// Number of malformed rows dropped during load.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

fn parse_row(fields: &[String], columns: ResolvedColumns, row: usize) -> Result<PointRecord> {
    let northing = parse_coordinate(fields, columns.northing, "northing", row)?;
    let easting = parse_coordinate(fields, columns.easting, "easting", row)?;

    let rest = fields
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != columns.northing && *index != columns.easting)
        .map(|(_, value)| value.clone())
        .collect();

    Ok(PointRecord::new(Point::new(easting, northing), rest))
}

fn parse_coordinate(fields: &[String], index: usize, name: &str, row: usize) -> Result<f64> {
    let raw = fields.get(index).ok_or_else(|| GeomatchError::MalformedRecord {
        row,
        reason: format!("missing {} column (index {})", name, index),
    })?;

    let value: f64 = raw.trim().parse().map_err(|_| GeomatchError::MalformedRecord {
        row,
        reason: format!("non-numeric {} value '{}'", name, raw),
    })?;

    if !value.is_finite() {
        return Err(GeomatchError::MalformedRecord {
            row,
            reason: format!("non-finite {} value '{}'", name, raw),
        });
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_resolve_columns() {
        let spec = ColumnSpec::new("northing_utm [m]", "easting_utm [m]");
        let header = header(&["id", "northing_utm [m]", "easting_utm [m]", "label"]);

        let columns = spec.resolve(&header).unwrap();

        assert_eq!(columns.northing, 1);
        assert_eq!(columns.easting, 2);
    }

    #[test]
    fn test_resolve_missing_column_fails() {
        let spec = ColumnSpec::new("northing_utm [m]", "easting_utm [m]");
        let header = header(&["id", "northing_utm [m]", "label"]);

        let err = spec.resolve(&header).unwrap_err();

        assert!(matches!(err, GeomatchError::ColumnNotFound { ref column } if column == "easting_utm [m]"));
    }

    #[test]
    fn test_resolve_same_column_twice_fails() {
        let spec = ColumnSpec::new("pos", "pos");
        let header = header(&["id", "pos"]);

        let err = spec.resolve(&header).unwrap_err();

        assert!(matches!(err, GeomatchError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_load_preserves_order_and_fields() {
        let columns = ResolvedColumns { northing: 0, easting: 1 };
        let rows = vec![row(&["10.0", "20.0", "a", "b"]), row(&["30.0", "40.0", "c", "d"])];

        let store = RecordStore::load(rows, columns);

        assert_eq!(store.len(), 2);
        assert_eq!(store.skipped(), 0);
        let first = store.get(0).unwrap();
        assert_eq!(first.northing(), 10.0);
        assert_eq!(first.easting(), 20.0);
        assert_eq!(first.fields, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.get(1).unwrap().fields, vec!["c".to_string(), "d".to_string()]);
    }

    #[test]
    fn test_load_skips_malformed_rows() {
        let columns = ResolvedColumns { northing: 0, easting: 1 };
        let rows = vec![
            row(&["10.0", "20.0"]),
            row(&["not-a-number", "20.0"]),
            row(&["10.0"]),
            row(&["NaN", "20.0"]),
            row(&["1.5", "-3.25", "payload"]),
        ];

        let store = RecordStore::load(rows, columns);

        assert_eq!(store.len(), 2);
        assert_eq!(store.skipped(), 3);
        assert_eq!(store.get(1).unwrap().fields, vec!["payload".to_string()]);
    }

    #[test]
    fn test_load_accepts_whitespace_padded_coordinates() {
        let columns = ResolvedColumns { northing: 0, easting: 1 };
        let store = RecordStore::load(vec![row(&[" 10.5 ", "\t-2.0"])], columns);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0).unwrap().northing(), 10.5);
        assert_eq!(store.get(0).unwrap().easting(), -2.0);
    }

    #[test]
    fn test_empty_store() {
        let columns = ResolvedColumns { northing: 0, easting: 1 };
        let store = RecordStore::load(Vec::<Vec<String>>::new(), columns);

        assert!(store.is_empty());
        assert_eq!(store.skipped(), 0);
        assert!(store.get(0).is_none());
    }
}
