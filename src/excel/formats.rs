//! Number formats of worksheet cells, read from the package parts directly
//!
//! calamine reports cell values but not the format code behind them, and the
//! code is what decides how a date serial is rendered. This module joins
//! `xl/styles.xml` (numFmts + cellXfs) with the `s` attribute of each cell in
//! the worksheet part, and reads the workbook's date system.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::warn;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::core::column::column_index;
use crate::core::date_format::builtin_format;
use crate::core::DateSystem;
use crate::error::{BridgeError, BridgeResult};

/// Format codes per (row, col), 0-based; "General" cells are omitted
pub type CellFormats = HashMap<(usize, usize), Arc<str>>;

/// Style information of one workbook package
pub struct StyleIndex {
    archive: ZipArchive<Cursor<Arc<[u8]>>>,
    sheet_paths: HashMap<String, String>,
    xf_formats: Vec<Option<Arc<str>>>,
    date_system: DateSystem,
}

impl StyleIndex {
    /// Read the workbook, relationship and style parts of an .xlsx package
    pub fn open(bytes: Arc<[u8]>) -> BridgeResult<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        let workbook = read_part(&mut archive, "xl/workbook.xml")?
            .ok_or_else(|| BridgeError::Workbook("Missing xl/workbook.xml".to_string()))?;
        let (sheet_ids, date_system) = parse_workbook(&workbook)?;

        let relationships = match read_part(&mut archive, "xl/_rels/workbook.xml.rels")? {
            Some(xml) => parse_relationships(&xml)?,
            None => HashMap::new(),
        };

        let sheet_paths = sheet_ids
            .into_iter()
            .filter_map(|(name, rel_id)| {
                relationships
                    .get(&rel_id)
                    .map(|target| (name, resolve_target(target)))
            })
            .collect();

        let xf_formats = match read_part(&mut archive, "xl/styles.xml")? {
            Some(xml) => parse_styles(&xml)?,
            None => Vec::new(),
        };

        Ok(Self {
            archive,
            sheet_paths,
            xf_formats,
            date_system,
        })
    }

    pub fn date_system(&self) -> DateSystem {
        self.date_system
    }

    /// Format codes of the styled cells of one worksheet
    pub fn sheet_formats(&mut self, sheet_name: &str) -> BridgeResult<CellFormats> {
        let Some(path) = self.sheet_paths.get(sheet_name).cloned() else {
            warn!(sheet = sheet_name, "No worksheet part found; using General formats");
            return Ok(CellFormats::new());
        };
        match read_part(&mut self.archive, &path)? {
            Some(xml) => parse_sheet_styles(&xml, &self.xf_formats),
            None => Ok(CellFormats::new()),
        }
    }
}

/// Read a package part as text; names match case-insensitively
fn read_part(archive: &mut ZipArchive<Cursor<Arc<[u8]>>>, name: &str) -> BridgeResult<Option<String>> {
    let Some(path) = archive
        .file_names()
        .find(|file_name| file_name.eq_ignore_ascii_case(name))
        .map(str::to_owned)
    else {
        return Ok(None);
    };

    let mut file = match archive.by_name(&path) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut xml = String::new();
    file.read_to_string(&mut xml)?;
    Ok(Some(xml))
}

/// Relationship targets are relative to `xl/` unless absolute
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

fn attribute(element: &BytesStart<'_>, name: &str) -> BridgeResult<Option<String>> {
    match element
        .try_get_attribute(name)
        .map_err(|e| BridgeError::Workbook(e.to_string()))?
    {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

/// Sheet names with their relationship ids, and the date system
fn parse_workbook(xml: &str) -> BridgeResult<(Vec<(String, String)>, DateSystem)> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut sheets = Vec::new();
    let mut date_system = DateSystem::Excel1900;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"workbookPr" => {
                    if let Some(flag) = attribute(&e, "date1904")? {
                        if flag == "1" || flag.eq_ignore_ascii_case("true") {
                            date_system = DateSystem::Excel1904;
                        }
                    }
                }
                b"sheet" => {
                    if let (Some(name), Some(rel_id)) = (attribute(&e, "name")?, attribute(&e, "r:id")?) {
                        sheets.push((name, rel_id));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok((sheets, date_system))
}

fn parse_relationships(xml: &str) -> BridgeResult<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut relationships = HashMap::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attribute(&e, "Id")?, attribute(&e, "Target")?) {
                    relationships.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(relationships)
}

/// Format code per cellXfs entry; `None` for General
fn parse_styles(xml: &str) -> BridgeResult<Vec<Option<Arc<str>>>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut custom: HashMap<u32, Arc<str>> = HashMap::new();
    let mut xf_ids: Vec<u32> = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"cellXfs" => in_cell_xfs = true,
            Event::End(e) if e.local_name().as_ref() == b"cellXfs" => in_cell_xfs = false,
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"numFmt" => {
                    let id = attribute(&e, "numFmtId")?.and_then(|v| v.parse::<u32>().ok());
                    if let (Some(id), Some(code)) = (id, attribute(&e, "formatCode")?) {
                        custom.insert(id, Arc::from(code));
                    }
                }
                b"xf" if in_cell_xfs => {
                    let id = attribute(&e, "numFmtId")?
                        .and_then(|v| v.parse::<u32>().ok())
                        .unwrap_or(0);
                    xf_ids.push(id);
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    let formats = xf_ids
        .into_iter()
        .map(|id| {
            let code = custom
                .get(&id)
                .cloned()
                .or_else(|| builtin_format(id).map(Arc::from))?;
            (!code.eq_ignore_ascii_case("General")).then_some(code)
        })
        .collect();
    Ok(formats)
}

fn parse_sheet_styles(xml: &str, xf_formats: &[Option<Arc<str>>]) -> BridgeResult<CellFormats> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut formats = CellFormats::new();
    let mut row: Option<usize> = None;
    let mut next_col = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => {
                    let explicit = attribute(&e, "r")?
                        .and_then(|v| v.parse::<usize>().ok())
                        .and_then(|r| r.checked_sub(1));
                    row = Some(explicit.unwrap_or_else(|| row.map_or(0, |r| r + 1)));
                    next_col = 0;
                }
                b"c" => {
                    let position = match attribute(&e, "r")?.as_deref().and_then(parse_reference) {
                        Some(position) => position,
                        None => (row.unwrap_or(0), next_col),
                    };
                    next_col = position.1 + 1;

                    let style = attribute(&e, "s")?.and_then(|v| v.parse::<usize>().ok());
                    if let Some(code) = style.and_then(|s| xf_formats.get(s).cloned().flatten()) {
                        formats.insert(position, code);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(formats)
}

/// "B3" → (2, 1)
fn parse_reference(reference: &str) -> Option<(usize, usize)> {
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let row = digits.parse::<usize>().ok()?.checked_sub(1)?;
    let col = column_index(letters).checked_sub(1)?;
    Some((row, col))
}
