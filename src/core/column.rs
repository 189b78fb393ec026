//! Spreadsheet column labels ("A", "Z", "AA", ...) as base-26 numbers with digits 1..26

/// Convert column letters to a 1-based column index
///
/// Examples:
/// - A → 1
/// - Z → 26
/// - AA → 27
/// - BA → 53
///
/// Empty input yields 0. Callers validate the letters beforehand; very long
/// runs saturate instead of overflowing.
pub fn column_index(letters: &str) -> usize {
    letters.bytes().fold(0usize, |index, letter| {
        let digit = usize::from(letter.saturating_sub(b'A')) + 1;
        index.saturating_mul(26).saturating_add(digit)
    })
}

/// Convert a 1-based column index back to its letters (0 yields an empty string)
pub fn column_letters(index: usize) -> String {
    let mut result = String::new();
    let mut idx = index;

    while idx > 0 {
        let remainder = (idx - 1) % 26;
        result.insert(0, (b'A' + remainder as u8) as char);
        idx = (idx - 1) / 26;
    }

    result
}
