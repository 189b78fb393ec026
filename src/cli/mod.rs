//! CLI command handlers

pub mod commands;

pub use commands::{docx, extract, from_csv, serve, sheets, OutputFormat};
