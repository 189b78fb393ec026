//! Output formatters for extracted datasets

use serde::Serialize;

use crate::core::ExtractedDataset;

/// JSON body of an extraction: `{"rows": n, "cols": m, "items": [[...], ...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonEnvelope {
    pub rows: usize,
    pub cols: usize,
    pub items: ExtractedDataset,
}

impl JsonEnvelope {
    pub fn new(dataset: ExtractedDataset) -> Self {
        Self {
            rows: dataset.row_count(),
            cols: dataset.col_count(),
            items: dataset,
        }
    }
}

/// Render a dataset as CSV text
///
/// Every cell is wrapped in double quotes as-is (embedded quotes are not
/// escaped), cells are comma-separated and every row ends with a newline.
pub fn to_csv(dataset: &ExtractedDataset) -> String {
    let mut csv = String::new();
    for row in dataset.rows() {
        let line = row
            .iter()
            .map(|cell| format!("\"{}\"", cell))
            .collect::<Vec<_>>()
            .join(",");
        csv.push_str(&line);
        csv.push('\n');
    }
    csv
}
