//! Sheet-region extraction: range parsing, cell serialization, sentinel scans

pub mod cell;
pub mod column;
pub mod date_format;
pub mod extractor;
pub mod range;
pub mod sheet;

pub use cell::{serialize, Cell, DateSystem, FormulaResult, Number};
pub use column::column_index;
pub use extractor::{extract, ExtractedDataset, Orientation};
pub use range::RangeDescriptor;
pub use sheet::{Row, Sheet, Worksheet};
