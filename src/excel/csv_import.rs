//! CSV → .xlsx conversion

use rust_xlsxwriter::Workbook;
use tracing::debug;

use crate::core::range::{MAX_COLUMNS, MAX_ROWS};
use crate::error::{BridgeError, BridgeResult};

const MAX_SHEET_NAME_LEN: usize = 31;
const INVALID_SHEET_NAME_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Convert CSV text (Excel dialect, no header row, ragged rows allowed) into
/// a single-sheet workbook where every field is a string cell
pub fn csv_to_xlsx(bytes: &[u8], sheet_name: &str) -> BridgeResult<Vec<u8>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(sanitize_sheet_name(sheet_name))
        .map_err(|e| BridgeError::Export(format!("Failed to set worksheet name: {}", e)))?;

    let mut row_count = 0usize;
    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        if row_idx >= MAX_ROWS {
            return Err(BridgeError::UnsupportedFile(format!(
                "The CSV file has more than {} rows.",
                MAX_ROWS
            )));
        }
        if record.len() > MAX_COLUMNS {
            return Err(BridgeError::UnsupportedFile(format!(
                "Row {} has more than {} columns.",
                row_idx + 1,
                MAX_COLUMNS
            )));
        }

        for (col_idx, field) in record.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, field)
                .map_err(|e| BridgeError::Export(format!("Failed to write cell: {}", e)))?;
        }
        row_count += 1;
    }

    let buffer = workbook
        .save_to_buffer()
        .map_err(|e| BridgeError::Export(format!("Failed to save workbook: {}", e)))?;
    debug!(rows = row_count, bytes = buffer.len(), "Converted CSV to xlsx");
    Ok(buffer)
}

/// Make a file base name usable as a worksheet name
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if INVALID_SHEET_NAME_CHARS.contains(&c) { '_' } else { c })
        .take(MAX_SHEET_NAME_LEN)
        .collect();

    // Excel also rejects names wrapped in apostrophes
    let cleaned = cleaned.trim_matches('\'');
    if cleaned.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned.to_string()
    }
}
