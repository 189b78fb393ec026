//! Plain-text extraction from Word (.docx) documents

use std::io::{Cursor, Read, Seek};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::debug;
use zip::ZipArchive;

use crate::error::{BridgeError, BridgeResult};

const DOCUMENT_PART: &str = "word/document.xml";

/// Text of the document: headers, then the main body, then footers
///
/// Runs are concatenated in document order. A `w:tab` inside a run becomes a
/// tab, `w:br`/`w:cr` a line break, and every paragraph ends with a newline.
/// Table cells are separated by tabs and each table row ends with a newline.
pub fn extract_text(bytes: &[u8]) -> BridgeResult<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| BridgeError::Document(format!("Not a valid .docx package: {}", e)))?;

    if !archive.file_names().any(|name| name == DOCUMENT_PART) {
        return Err(BridgeError::Document(format!("Missing {}", DOCUMENT_PART)));
    }
    let headers = story_parts(&archive, "word/header");
    let footers = story_parts(&archive, "word/footer");

    let mut text = String::new();
    for part in &headers {
        text.push_str(&document_text(&read_part(&mut archive, part)?)?);
    }
    text.push_str(&document_text(&read_part(&mut archive, DOCUMENT_PART)?)?);
    for part in &footers {
        text.push_str(&document_text(&read_part(&mut archive, part)?)?);
    }

    debug!(
        chars = text.len(),
        headers = headers.len(),
        footers = footers.len(),
        "Extracted document text"
    );
    Ok(text)
}

/// `word/header*.xml` or `word/footer*.xml` parts in numeric order
fn story_parts<R: Read + Seek>(archive: &ZipArchive<R>, prefix: &str) -> Vec<String> {
    let mut parts: Vec<String> = archive
        .file_names()
        .filter(|name| name.starts_with(prefix) && name.ends_with(".xml"))
        .map(str::to_string)
        .collect();
    parts.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    parts
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> BridgeResult<String> {
    let mut xml = String::new();
    archive
        .by_name(name)
        .map_err(|e| BridgeError::Document(format!("{}: {}", name, e)))?
        .read_to_string(&mut xml)?;
    Ok(xml)
}

/// Text of one WordprocessingML story, matched by local name so any
/// namespace prefix works
fn document_text(xml: &str) -> BridgeResult<String> {
    let mut reader = Reader::from_str(xml);

    let mut text = String::new();
    let mut in_text = false;
    // tab stops in w:pPr/w:tabs also use w:tab; only runs carry content
    let mut run_depth = 0usize;

    loop {
        match reader.read_event().map_err(document_error)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"r" => run_depth += 1,
                b"t" if run_depth > 0 => in_text = true,
                b"tab" if run_depth > 0 => text.push('\t'),
                b"br" | b"cr" if run_depth > 0 => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" if run_depth > 0 => text.push('\t'),
                b"br" | b"cr" if run_depth > 0 => text.push('\n'),
                b"p" => text.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text => {
                text.push_str(&e.unescape().map_err(document_error)?);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"r" => run_depth = run_depth.saturating_sub(1),
                b"t" => in_text = false,
                b"p" => text.push('\n'),
                b"tc" => {
                    if text.ends_with('\n') {
                        text.pop();
                    }
                    text.push('\t');
                }
                b"tr" => {
                    if text.ends_with('\t') {
                        text.pop();
                    }
                    text.push('\n');
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(text)
}

fn document_error(err: quick_xml::Error) -> BridgeError {
    BridgeError::Document(err.to_string())
}
