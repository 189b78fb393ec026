//! Sparse, read-only worksheet grids

use std::collections::BTreeMap;

use super::cell::Cell;

/// Random access to the rows of a worksheet
///
/// Any row may be absent; absence is distinct from a row whose cells are all
/// blank, and the extractor treats the two differently per orientation.
pub trait Sheet {
    fn row(&self, index: usize) -> Option<&Row>;
}

/// One worksheet row, sparse over columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: BTreeMap<usize, Cell>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, col: usize) -> Option<&Cell> {
        self.cells.get(&col)
    }

    pub fn set_cell(&mut self, col: usize, cell: Cell) {
        self.cells.insert(col, cell);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// In-memory worksheet, fully materialized before extraction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Worksheet {
    name: String,
    rows: BTreeMap<usize, Row>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: BTreeMap::new(),
        }
    }

    /// Build a worksheet from text rows starting at A1; empty strings leave the cell absent
    pub fn from_text_rows<R, S>(name: impl Into<String>, rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sheet = Self::new(name);
        for (row_idx, row) in rows.into_iter().enumerate() {
            for (col_idx, value) in row.into_iter().enumerate() {
                let value = value.as_ref();
                if !value.is_empty() {
                    sheet.set_cell(row_idx, col_idx, Cell::text(value));
                }
            }
        }
        sheet
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
        self.rows.entry(row).or_default().set_cell(col, cell);
    }

    /// Register a row that has no cells
    pub fn insert_empty_row(&mut self, row: usize) {
        self.rows.entry(row).or_default();
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(&row).and_then(|r| r.cell(col))
    }
}

impl Sheet for Worksheet {
    fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(&index)
    }
}
