//! SheetBridge - spreadsheet and document conversion service
//!
//! Extracts rectangular regions of .xlsx worksheets as JSON or CSV, converts
//! CSV files into workbooks and pulls plain text out of .docx documents.
//!
//! # Features
//!
//! - Range expressions such as `A1:C1` with portrait or landscape scans
//! - Cells rendered the way they are stored, dates in their own pattern
//! - HTTP API (Axum) and command-line front ends
//!
//! # Example
//!
//! ```no_run
//! use sheetbridge::core::{extract, Orientation, RangeDescriptor};
//! use sheetbridge::excel::XlsxDocument;
//!
//! let bytes = std::fs::read("book.xlsx")?;
//! let mut document = XlsxDocument::from_bytes(bytes)?;
//! let sheet = document.worksheet(None)?;
//!
//! let range = RangeDescriptor::parse("A1:C1")?;
//! let dataset = extract(&sheet, &range, Orientation::Portrait)?;
//! println!("{} rows", dataset.row_count());
//! # Ok::<(), sheetbridge::error::BridgeError>(())
//! ```

pub mod api;
pub mod cli;
pub mod core;
pub mod docx;
pub mod error;
pub mod excel;
pub mod output;

// Re-export commonly used types
pub use error::{BridgeError, BridgeResult};
