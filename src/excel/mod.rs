//! Workbook I/O
//!
//! - Read: .xlsx → [`Worksheet`](crate::core::Worksheet) with values, formulas and number formats
//! - Write: CSV → single-sheet .xlsx

mod csv_import;
mod formats;
mod workbook;

pub use csv_import::{csv_to_xlsx, sanitize_sheet_name};
pub use formats::{CellFormats, StyleIndex};
pub use workbook::{SheetEntry, XlsxDocument};
