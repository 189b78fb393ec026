//! Workbook loading and extraction tests against generated .xlsx files

use pretty_assertions::assert_eq;
use rust_xlsxwriter::{Format, Formula, Workbook};
use sheetbridge::core::{extract, Cell, Orientation, RangeDescriptor};
use sheetbridge::error::BridgeError;
use sheetbridge::excel::{csv_to_xlsx, SheetEntry, XlsxDocument};
use sheetbridge::output::{to_csv, JsonEnvelope};

fn rows(values: &[&[&str]]) -> Vec<Vec<String>> {
    values
        .iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect()
}

/// Two sheets: "Data" holds a 3-column table with a blank row after it,
/// "Dates" holds date-formatted serials and a formula
fn fixture() -> Vec<u8> {
    let mut workbook = Workbook::new();

    let data = workbook.add_worksheet();
    data.set_name("Data").unwrap();
    for (col, header) in ["Name", "Qty", "Active"].iter().enumerate() {
        data.write_string(0, col as u16, *header).unwrap();
    }
    data.write_string(1, 0, "Apple").unwrap();
    data.write_number(1, 1, 10.0).unwrap();
    data.write_boolean(1, 2, true).unwrap();
    data.write_string(2, 0, "Pear").unwrap();
    data.write_number(2, 1, 2.5).unwrap();
    data.write_boolean(2, 2, false).unwrap();
    // row 4 is blank, row 5 must not be reached
    data.write_string(4, 0, "Hidden").unwrap();

    let dates = workbook.add_worksheet();
    dates.set_name("Dates").unwrap();
    let day = Format::new().set_num_format("yyyy-mm-dd");
    let stamp = Format::new().set_num_format("dd/mm/yyyy hh:mm");
    dates.write_string(0, 0, "Day").unwrap();
    dates.write_string(0, 1, "Stamp").unwrap();
    dates.write_string(0, 2, "Double").unwrap();
    dates.write_number_with_format(1, 0, 45000.0, &day).unwrap();
    dates.write_number_with_format(1, 1, 45000.5, &stamp).unwrap();
    dates
        .write_formula(1, 2, Formula::new("=B2*2").set_result("90001"))
        .unwrap();

    workbook.save_to_buffer().unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// SHEET LISTING
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_sheet_entries_in_workbook_order() {
    let document = XlsxDocument::from_bytes(fixture()).unwrap();
    assert_eq!(
        document.sheet_entries(),
        vec![
            SheetEntry {
                name: "Data".to_string(),
                index: 0
            },
            SheetEntry {
                name: "Dates".to_string(),
                index: 1
            },
        ]
    );
}

#[test]
fn test_not_a_workbook() {
    let result = XlsxDocument::from_bytes(b"definitely not a zip".to_vec());
    assert!(matches!(result, Err(BridgeError::Workbook(_))));
}

// ═══════════════════════════════════════════════════════════════════════════
// WORKSHEET LOADING
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_default_sheet_is_first() {
    let mut document = XlsxDocument::from_bytes(fixture()).unwrap();
    assert_eq!(document.worksheet(None).unwrap().name(), "Data");
    assert_eq!(document.worksheet(Some("")).unwrap().name(), "Data");
    assert_eq!(document.worksheet(Some("Dates")).unwrap().name(), "Dates");
}

#[test]
fn test_unknown_sheet() {
    let mut document = XlsxDocument::from_bytes(fixture()).unwrap();
    let err = document.worksheet(Some("Missing")).unwrap_err();
    assert!(matches!(err, BridgeError::SheetNotFound(ref name) if name == "Missing"));
    assert_eq!(err.to_string(), "The following sheet doesn't exist: Missing");
}

#[test]
fn test_cell_kinds_survive_loading() {
    let mut document = XlsxDocument::from_bytes(fixture()).unwrap();
    let sheet = document.worksheet(Some("Data")).unwrap();

    assert_eq!(sheet.cell(0, 0), Some(&Cell::text("Name")));
    assert_eq!(sheet.cell(1, 1), Some(&Cell::number(10.0)));
    assert_eq!(sheet.cell(1, 2), Some(&Cell::Boolean(true)));
    assert!(sheet.cell(3, 0).is_none());
}

#[test]
fn test_formula_keeps_cached_value() {
    let mut document = XlsxDocument::from_bytes(fixture()).unwrap();
    let sheet = document.worksheet(Some("Dates")).unwrap();

    match sheet.cell(1, 2) {
        Some(Cell::Formula { expression, cached }) => {
            assert_eq!(expression, "B2*2");
            assert!(cached.is_some());
        }
        other => panic!("expected a formula cell, got {:?}", other),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// EXTRACTION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_portrait_stops_at_blank_row() {
    let mut document = XlsxDocument::from_bytes(fixture()).unwrap();
    let sheet = document.worksheet(None).unwrap();
    let range = RangeDescriptor::parse("A1:C1").unwrap();

    let dataset = extract(&sheet, &range, Orientation::Portrait).unwrap();
    assert_eq!(
        dataset.rows(),
        rows(&[
            &["Name", "Qty", "Active"],
            &["Apple", "10.0", "true"],
            &["Pear", "2.5", "false"],
        ])
        .as_slice()
    );
}

#[test]
fn test_landscape_reads_columns() {
    let mut document = XlsxDocument::from_bytes(fixture()).unwrap();
    let sheet = document.worksheet(None).unwrap();
    let range = RangeDescriptor::parse("A1:A3").unwrap();

    let dataset = extract(&sheet, &range, Orientation::Landscape).unwrap();
    assert_eq!(
        dataset.rows(),
        rows(&[
            &["Name", "Qty", "Active"],
            &["Apple", "10.0", "true"],
            &["Pear", "2.5", "false"],
        ])
        .as_slice()
    );
}

#[test]
fn test_dates_use_their_own_pattern() {
    let mut document = XlsxDocument::from_bytes(fixture()).unwrap();
    let sheet = document.worksheet(Some("Dates")).unwrap();
    let range = RangeDescriptor::parse("A1:C1").unwrap();

    let dataset = extract(&sheet, &range, Orientation::Portrait).unwrap();
    assert_eq!(
        dataset.rows(),
        rows(&[
            &["Day", "Stamp", "Double"],
            &["2023-03-15", "15/03/2023 12:00", "90001.0"],
        ])
        .as_slice()
    );
}

#[test]
fn test_extraction_is_idempotent() {
    let mut document = XlsxDocument::from_bytes(fixture()).unwrap();
    let sheet = document.worksheet(None).unwrap();
    let range = RangeDescriptor::parse("A1:C1").unwrap();

    let first = extract(&sheet, &range, Orientation::Portrait).unwrap();
    let second = extract(&sheet, &range, Orientation::Portrait).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_range_outside_data_is_empty() {
    let mut document = XlsxDocument::from_bytes(fixture()).unwrap();
    let sheet = document.worksheet(None).unwrap();
    let range = RangeDescriptor::parse("K100:M100").unwrap();

    let dataset = extract(&sheet, &range, Orientation::Portrait).unwrap();
    assert!(dataset.is_empty());
    assert_eq!(
        serde_json::to_string(&JsonEnvelope::new(dataset)).unwrap(),
        r#"{"rows":0,"cols":0,"items":[]}"#
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// CSV ROUND TRIP
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_converted_csv_extracts_back() {
    let csv = "\"A1\",\"B1\",\"C1\"\n\"A2\",\"B2\",\"C2\"\n";
    let workbook = csv_to_xlsx(csv.as_bytes(), "grid").unwrap();

    let mut document = XlsxDocument::from_bytes(workbook).unwrap();
    let sheet = document.worksheet(Some("grid")).unwrap();
    let range = RangeDescriptor::parse("A1:C1").unwrap();
    let dataset = extract(&sheet, &range, Orientation::Portrait).unwrap();

    assert_eq!(to_csv(&dataset), csv);
}
