//! Workbook loading: calamine values + formulas, joined with number formats

use std::io::Cursor;
use std::sync::Arc;

use calamine::{Data, Range, Reader, Xlsx};
use serde::Serialize;
use tracing::{debug, warn};

use super::formats::{CellFormats, StyleIndex};
use crate::core::date_format::builtin_format;
use crate::core::{Cell, DateSystem, FormulaResult, Number, Worksheet};
use crate::error::{BridgeError, BridgeResult};

/// Pattern for date cells whose own format could not be resolved ("m/d/yy h:mm")
const FALLBACK_DATE_FORMAT_ID: u32 = 22;

/// One entry of the sheet listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetEntry {
    pub name: String,
    pub index: usize,
}

/// An opened .xlsx workbook held in memory
pub struct XlsxDocument {
    reader: Xlsx<Cursor<Arc<[u8]>>>,
    styles: Option<StyleIndex>,
}

impl XlsxDocument {
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> BridgeResult<Self> {
        let bytes: Arc<[u8]> = bytes.into();
        let reader = Xlsx::new(Cursor::new(Arc::clone(&bytes)))?;

        let styles = match StyleIndex::open(bytes) {
            Ok(styles) => Some(styles),
            Err(e) => {
                warn!(error = %e, "Could not read number formats; using General");
                None
            }
        };

        Ok(Self { reader, styles })
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<String> {
        self.reader.sheet_names()
    }

    pub fn sheet_entries(&self) -> Vec<SheetEntry> {
        self.sheet_names()
            .into_iter()
            .enumerate()
            .map(|(index, name)| SheetEntry { name, index })
            .collect()
    }

    /// Load a worksheet by name; `None` or an empty name selects the first sheet
    pub fn worksheet(&mut self, name: Option<&str>) -> BridgeResult<Worksheet> {
        let names = self.sheet_names();
        let sheet_name = match name.filter(|n| !n.is_empty()) {
            Some(requested) => names
                .into_iter()
                .find(|n| n == requested)
                .ok_or_else(|| BridgeError::SheetNotFound(requested.to_string()))?,
            None => names
                .into_iter()
                .next()
                .ok_or_else(|| BridgeError::Workbook("The workbook contains no sheets".to_string()))?,
        };

        let values = self.reader.worksheet_range(&sheet_name)?;
        let formulas = match self.reader.worksheet_formula(&sheet_name) {
            Ok(formulas) => Some(formulas),
            Err(e) => {
                warn!(sheet = %sheet_name, error = %e, "Could not read formulas");
                None
            }
        };

        let (formats, date_system) = match self.styles.as_mut() {
            Some(styles) => {
                let date_system = styles.date_system();
                match styles.sheet_formats(&sheet_name) {
                    Ok(formats) => (formats, date_system),
                    Err(e) => {
                        warn!(sheet = %sheet_name, error = %e, "Could not read cell styles");
                        (CellFormats::new(), date_system)
                    }
                }
            }
            None => (CellFormats::new(), DateSystem::Excel1900),
        };

        let sheet = build_worksheet(&sheet_name, &values, formulas.as_ref(), &formats, date_system);
        debug!(sheet = %sheet_name, rows = sheet.row_count(), "Loaded worksheet");
        Ok(sheet)
    }
}

/// Assemble the sparse grid; positions are absolute and 0-based
fn build_worksheet(
    name: &str,
    values: &Range<Data>,
    formulas: Option<&Range<String>>,
    formats: &CellFormats,
    date_system: DateSystem,
) -> Worksheet {
    let mut sheet = Worksheet::new(name);
    let origin = values.start().unwrap_or((0, 0));

    for (row, col, data) in values.used_cells() {
        let position = (origin.0 as usize + row, origin.1 as usize + col);
        if let Some(cell) = value_cell(data, formats.get(&position), date_system) {
            sheet.set_cell(position.0, position.1, cell);
        }
    }

    if let Some(formulas) = formulas {
        let origin = formulas.start().unwrap_or((0, 0));
        for (row, col, expression) in formulas.used_cells() {
            if expression.is_empty() {
                continue;
            }
            let (row, col) = (origin.0 as usize + row, origin.1 as usize + col);
            let cached = sheet.cell(row, col).cloned().and_then(cached_result);
            sheet.set_cell(row, col, Cell::formula(expression.clone(), cached));
        }
    }

    sheet
}

fn value_cell(data: &Data, format: Option<&Arc<str>>, date_system: DateSystem) -> Option<Cell> {
    let number = |value: f64, format: Option<Arc<str>>| Number {
        value,
        format,
        date_system,
    };

    let cell = match data {
        Data::Empty => return None,
        Data::String(text) if text.is_empty() => return None,
        Data::Float(value) => Cell::Numeric(number(*value, format.cloned())),
        Data::Int(value) => Cell::Numeric(number(*value as f64, format.cloned())),
        Data::Bool(value) => Cell::Boolean(*value),
        Data::String(text) => Cell::Text(text.clone()),
        Data::DateTime(datetime) => {
            let format = format
                .cloned()
                .or_else(|| builtin_format(FALLBACK_DATE_FORMAT_ID).map(Arc::from));
            Cell::Numeric(number(datetime.as_f64(), format))
        }
        Data::DateTimeIso(text) | Data::DurationIso(text) => Cell::Text(text.clone()),
        Data::Error(error) => Cell::Error(error.to_string()),
    };
    Some(cell)
}

fn cached_result(cell: Cell) -> Option<FormulaResult> {
    match cell {
        Cell::Numeric(number) => Some(FormulaResult::Numeric(number)),
        Cell::Boolean(value) => Some(FormulaResult::Boolean(value)),
        Cell::Text(text) => Some(FormulaResult::Text(text)),
        Cell::Error(error) => Some(FormulaResult::Error(error)),
        Cell::Formula { cached, .. } => cached,
        Cell::Blank => None,
    }
}
