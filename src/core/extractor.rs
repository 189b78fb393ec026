//! Region extraction with auto-detected extent
//!
//! Both orientations run the same sentinel scan: the caller fixes a band on
//! one axis and the scan walks the other axis until it reaches a line that is
//! missing or entirely blank.
//!
//! - Portrait fixes the column band of a single seed row and discovers rows
//!   downward. A missing sheet row ends the scan.
//! - Landscape fixes the row band of a single seed column and discovers
//!   columns rightward. A missing sheet row only contributes blanks; the row
//!   band is never shortened.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use super::cell::serialize;
use super::range::{RangeDescriptor, MAX_COLUMNS, MAX_ROWS};
use super::sheet::Sheet;
use crate::error::{BridgeError, BridgeResult};

/// Scan orientation of an extraction request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Parse an optional request token; absent or empty means portrait
    pub fn from_param(value: Option<&str>) -> BridgeResult<Self> {
        match value.map(str::trim) {
            None | Some("") => Ok(Orientation::Portrait),
            Some(token) => token.parse(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

impl FromStr for Orientation {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("portrait") {
            Ok(Orientation::Portrait)
        } else if s.eq_ignore_ascii_case("landscape") {
            Ok(Orientation::Landscape)
        } else {
            Err(BridgeError::InvalidOrientation(s.to_string()))
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered rows of cell strings, all of the same width
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtractedDataset {
    rows: Vec<Vec<String>>,
}

impl ExtractedDataset {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}

/// Axis walked by the sentinel scan, with the band fixed on the other axis
enum ScanAxis {
    /// Walk rows; each line spans the fixed column band
    Rows { columns: RangeInclusive<usize> },
    /// Walk columns; each line spans the fixed row band
    Columns { rows: RangeInclusive<usize> },
}

impl ScanAxis {
    fn limit(&self) -> usize {
        match self {
            ScanAxis::Rows { .. } => MAX_ROWS,
            ScanAxis::Columns { .. } => MAX_COLUMNS,
        }
    }

    /// Serialized values along the band at `at`, or `None` when the line is missing
    fn line<S: Sheet + ?Sized>(&self, sheet: &S, at: usize) -> Option<Vec<String>> {
        match self {
            ScanAxis::Rows { columns } => {
                let row = sheet.row(at)?;
                Some(columns.clone().map(|col| serialize(row.cell(col))).collect())
            }
            ScanAxis::Columns { rows } => Some(
                rows.clone()
                    .map(|row| serialize(sheet.row(row).and_then(|r| r.cell(at))))
                    .collect(),
            ),
        }
    }

    /// Collect lines from `start` until the first missing or all-blank line
    fn scan<S: Sheet + ?Sized>(&self, sheet: &S, start: usize) -> Vec<Vec<String>> {
        let mut lines = Vec::new();
        for at in start..self.limit() {
            match self.line(sheet, at) {
                Some(line) if line.iter().any(|value| !value.is_empty()) => lines.push(line),
                _ => break,
            }
        }
        lines
    }
}

/// Extract a region of `sheet` described by `range`, scanning in `orientation`
///
/// Portrait requires a single-row range and Landscape a single-column range;
/// any other combination fails with `InvalidOrientationForRange`.
pub fn extract<S: Sheet + ?Sized>(
    sheet: &S,
    range: &RangeDescriptor,
    orientation: Orientation,
) -> BridgeResult<ExtractedDataset> {
    let rows = match orientation {
        Orientation::Portrait => {
            if range.start_row != range.end_row {
                return Err(BridgeError::InvalidOrientationForRange(
                    "If the mode `portrait` is selected, the start and end rows must be the same."
                        .to_string(),
                ));
            }
            let axis = ScanAxis::Rows {
                columns: range.start_col..=range.end_col,
            };
            axis.scan(sheet, range.start_row)
        }
        Orientation::Landscape => {
            if range.start_col != range.end_col {
                return Err(BridgeError::InvalidOrientationForRange(
                    "If the mode `landscape` is selected, the start and end columns must be the same."
                        .to_string(),
                ));
            }
            let axis = ScanAxis::Columns {
                rows: range.start_row..=range.end_row,
            };
            let columns = axis.scan(sheet, range.start_col);
            transpose(columns, range.height())
        }
    };

    let dataset = ExtractedDataset::new(rows);
    debug!(
        range = %range,
        orientation = %orientation,
        rows = dataset.row_count(),
        cols = dataset.col_count(),
        "Extracted sheet region"
    );
    Ok(dataset)
}

/// Turn column lines into `height` rows; with no columns every row is empty
fn transpose(columns: Vec<Vec<String>>, height: usize) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = (0..height)
        .map(|_| Vec::with_capacity(columns.len()))
        .collect();
    for column in columns {
        for (row, value) in rows.iter_mut().zip(column) {
            row.push(value);
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cell::{Cell, Number};
    use crate::core::sheet::Worksheet;

    fn extract_str(sheet: &Worksheet, range: &str, orientation: Orientation) -> Vec<Vec<String>> {
        let range = RangeDescriptor::parse(range).unwrap();
        extract(sheet, &range, orientation).unwrap().into_rows()
    }

    fn rows(values: &[&[&str]]) -> Vec<Vec<String>> {
        values
            .iter()
            .map(|row| row.iter().map(|v| v.to_string()).collect())
            .collect()
    }

    fn grid() -> Worksheet {
        Worksheet::from_text_rows("Data", [["A1", "B1", "C1"], ["A2", "B2", "C2"]])
    }

    // ==================== Orientation Tests ====================

    #[test]
    fn test_orientation_parse_case_insensitive() {
        assert_eq!("portrait".parse::<Orientation>().unwrap(), Orientation::Portrait);
        assert_eq!("LANDSCAPE".parse::<Orientation>().unwrap(), Orientation::Landscape);
        assert_eq!("Landscape".parse::<Orientation>().unwrap(), Orientation::Landscape);
    }

    #[test]
    fn test_orientation_defaults_to_portrait() {
        assert_eq!(Orientation::from_param(None).unwrap(), Orientation::Portrait);
        assert_eq!(Orientation::from_param(Some("")).unwrap(), Orientation::Portrait);
    }

    #[test]
    fn test_orientation_rejects_unknown_token() {
        let err = Orientation::from_param(Some("diagonal")).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidOrientation(_)));
    }

    // ==================== Portrait Tests ====================

    #[test]
    fn test_portrait_reads_until_missing_row() {
        let sheet = grid();
        assert_eq!(
            extract_str(&sheet, "A1:C1", Orientation::Portrait),
            rows(&[&["A1", "B1", "C1"], &["A2", "B2", "C2"]])
        );
    }

    #[test]
    fn test_portrait_stops_at_blank_row() {
        let mut sheet = grid();
        sheet.insert_empty_row(2);
        sheet.set_cell(3, 0, Cell::text("A4"));

        assert_eq!(
            extract_str(&sheet, "A1:C1", Orientation::Portrait),
            rows(&[&["A1", "B1", "C1"], &["A2", "B2", "C2"]])
        );
    }

    #[test]
    fn test_portrait_blank_inside_band_stops_even_with_data_outside() {
        let mut sheet = grid();
        sheet.set_cell(2, 5, Cell::text("outside"));
        sheet.set_cell(3, 0, Cell::text("A4"));

        assert_eq!(extract_str(&sheet, "A1:C1", Orientation::Portrait).len(), 2);
    }

    #[test]
    fn test_portrait_partial_row_is_kept_with_blanks() {
        let mut sheet = grid();
        sheet.set_cell(2, 1, Cell::text("B3"));

        assert_eq!(
            extract_str(&sheet, "A1:C1", Orientation::Portrait),
            rows(&[&["A1", "B1", "C1"], &["A2", "B2", "C2"], &["", "B3", ""]])
        );
    }

    #[test]
    fn test_portrait_narrow_band_starting_mid_sheet() {
        let sheet = grid();
        assert_eq!(
            extract_str(&sheet, "B2:C2", Orientation::Portrait),
            rows(&[&["B2", "C2"]])
        );
    }

    #[test]
    fn test_portrait_missing_seed_row_is_empty() {
        let sheet = grid();
        assert!(extract_str(&sheet, "A5:C5", Orientation::Portrait).is_empty());
    }

    #[test]
    fn test_portrait_requires_single_row() {
        let sheet = grid();
        let range = RangeDescriptor::parse("A1:C2").unwrap();
        let err = extract(&sheet, &range, Orientation::Portrait).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidOrientationForRange(_)));
    }

    #[test]
    fn test_portrait_serializes_typed_cells() {
        let mut sheet = Worksheet::new("Typed");
        sheet.set_cell(0, 0, Cell::number(10.0));
        sheet.set_cell(0, 1, Cell::Boolean(false));
        sheet.set_cell(0, 2, Cell::Numeric(Number::with_format(45_000.0, "yyyy-mm-dd")));

        assert_eq!(
            extract_str(&sheet, "A1:C1", Orientation::Portrait),
            rows(&[&["10.0", "false", "2023-03-15"]])
        );
    }

    // ==================== Landscape Tests ====================

    #[test]
    fn test_landscape_discovers_columns() {
        let sheet = grid();
        assert_eq!(
            extract_str(&sheet, "A1:A2", Orientation::Landscape),
            rows(&[&["A1", "B1", "C1"], &["A2", "B2", "C2"]])
        );
    }

    #[test]
    fn test_landscape_stops_at_first_band_wide_blank_column() {
        let mut sheet = Worksheet::new("Data");
        sheet.set_cell(0, 0, Cell::text("a"));
        sheet.set_cell(1, 1, Cell::text("b"));
        // column C blank across the band, D has data again
        sheet.set_cell(0, 3, Cell::text("d"));

        let result = extract_str(&sheet, "A1:A2", Orientation::Landscape);
        assert_eq!(result, rows(&[&["a", ""], &["", "b"]]));
        assert_eq!(result[0].len(), 2);
    }

    #[test]
    fn test_landscape_missing_rows_contribute_blanks() {
        let mut sheet = Worksheet::new("Data");
        sheet.set_cell(0, 0, Cell::text("x"));
        sheet.set_cell(0, 1, Cell::text("y"));
        sheet.set_cell(2, 0, Cell::text("z"));

        assert_eq!(
            extract_str(&sheet, "A1:A4", Orientation::Landscape),
            rows(&[&["x", "y"], &["", ""], &["z", ""], &["", ""]])
        );
    }

    #[test]
    fn test_landscape_blank_seed_column_yields_empty_rows() {
        let sheet = grid();
        let result = extract_str(&sheet, "E1:E3", Orientation::Landscape);
        assert_eq!(result, vec![Vec::<String>::new(); 3]);

        let range = RangeDescriptor::parse("E1:E3").unwrap();
        let dataset = extract(&sheet, &range, Orientation::Landscape).unwrap();
        assert_eq!(dataset.row_count(), 3);
        assert_eq!(dataset.col_count(), 0);
    }

    #[test]
    fn test_landscape_requires_single_column() {
        let sheet = grid();
        let range = RangeDescriptor::parse("A1:B2").unwrap();
        let err = extract(&sheet, &range, Orientation::Landscape).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidOrientationForRange(_)));
    }

    // ==================== Shared Properties ====================

    #[test]
    fn test_extraction_is_idempotent() {
        let sheet = grid();
        let range = RangeDescriptor::parse("A1:C1").unwrap();
        let first = extract(&sheet, &range, Orientation::Portrait).unwrap();
        let second = extract(&sheet, &range, Orientation::Portrait).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_cell_range_works_in_both_orientations() {
        let sheet = grid();
        assert_eq!(
            extract_str(&sheet, "A1:A1", Orientation::Portrait),
            rows(&[&["A1"], &["A2"]])
        );
        assert_eq!(
            extract_str(&sheet, "A1:A1", Orientation::Landscape),
            rows(&[&["A1", "B1", "C1"]])
        );
    }

    #[test]
    fn test_dataset_counts() {
        let dataset = ExtractedDataset::new(rows(&[&["a", "b"], &["c", "d"], &["e", "f"]]));
        assert_eq!(dataset.row_count(), 3);
        assert_eq!(dataset.col_count(), 2);
        assert!(!dataset.is_empty());
        assert_eq!(ExtractedDataset::default().col_count(), 0);
    }
}
