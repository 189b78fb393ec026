//! Range descriptors ("A1:D10") decomposed into 0-based bounds

use std::fmt;

use regex::Regex;

use super::column::{column_index, column_letters};
use crate::error::{BridgeError, BridgeResult};

/// Largest row number a worksheet can address
pub const MAX_ROWS: usize = 1_048_576;

/// Largest column number a worksheet can address (XFD)
pub const MAX_COLUMNS: usize = 16_384;

/// A parsed cell range, 0-based and inclusive on both axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeDescriptor {
    pub start_col: usize,
    pub end_col: usize,
    pub start_row: usize,
    pub end_row: usize,
}

impl RangeDescriptor {
    /// Parse a range expression such as `A1:D10`
    ///
    /// The whole string must match `[A-Z]+[0-9]+:[A-Z]+[0-9]+` and the end
    /// corner may not precede the start corner on either axis.
    pub fn parse(range: &str) -> BridgeResult<Self> {
        let pattern = Regex::new(r"^([A-Z]+)([0-9]+):([A-Z]+)([0-9]+)$")
            .map_err(|e| BridgeError::Internal(format!("Invalid range pattern: {}", e)))?;

        let caps = pattern
            .captures(range)
            .ok_or_else(|| BridgeError::InvalidRange(range.to_string()))?;

        let start_col = parse_column(&caps[1], range)?;
        let start_row = parse_row(&caps[2], range)?;
        let end_col = parse_column(&caps[3], range)?;
        let end_row = parse_row(&caps[4], range)?;

        if end_col < start_col {
            return Err(BridgeError::InvalidRange(format!(
                "{}: the end column needs to be after the start column",
                range
            )));
        }
        if end_row < start_row {
            return Err(BridgeError::InvalidRange(format!(
                "{}: the end row needs to be after the start row",
                range
            )));
        }

        Ok(Self {
            start_col,
            end_col,
            start_row,
            end_row,
        })
    }

    pub fn width(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    pub fn height(&self) -> usize {
        self.end_row - self.start_row + 1
    }
}

impl fmt::Display for RangeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}{}",
            column_letters(self.start_col + 1),
            self.start_row + 1,
            column_letters(self.end_col + 1),
            self.end_row + 1
        )
    }
}

fn parse_column(letters: &str, range: &str) -> BridgeResult<usize> {
    let index = column_index(letters);
    if index == 0 || index > MAX_COLUMNS {
        return Err(BridgeError::InvalidRange(format!(
            "{}: column {} is outside the worksheet",
            range, letters
        )));
    }
    Ok(index - 1)
}

fn parse_row(digits: &str, range: &str) -> BridgeResult<usize> {
    match digits.parse::<usize>() {
        Ok(row) if (1..=MAX_ROWS).contains(&row) => Ok(row - 1),
        _ => Err(BridgeError::InvalidRange(format!(
            "{}: row {} is outside the worksheet",
            range, digits
        ))),
    }
}
