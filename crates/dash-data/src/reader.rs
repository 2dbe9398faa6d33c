//! Spreadsheet decoding.
//!
//! Turns uploaded bytes into a [`RawTable`]: workbooks (xlsx, xlsm, xls,
//! ods) through `calamine`, anything else as delimited text through `csv`.
//! No cleaning happens here beyond dropping fully blank rows.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use dash_core::error::IngestionError;
use dash_core::models::{CellValue, RawTable};
use dash_core::time_utils;
use tracing::debug;

/// Container detected from the leading bytes of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Zip (xlsx, xlsm, ods) or OLE2 (xls) workbook.
    Workbook,
    /// Delimited text (CSV with `,`, `;` or tab).
    DelimitedText,
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

/// Detect the container of `bytes`, or `None` when it is neither a workbook
/// nor plausible text.
pub fn detect_format(bytes: &[u8]) -> Option<SourceFormat> {
    if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
        return Some(SourceFormat::Workbook);
    }
    if bytes.is_empty() || bytes.contains(&0) {
        return None;
    }
    Some(SourceFormat::DelimitedText)
}

/// Decode `bytes` into a raw table whose first row is the header.
pub fn read_raw_table(bytes: &[u8]) -> Result<RawTable, IngestionError> {
    let table = match detect_format(bytes) {
        Some(SourceFormat::Workbook) => read_workbook(bytes)?,
        Some(SourceFormat::DelimitedText) => read_delimited(&decode_text(bytes))?,
        None => {
            return Err(IngestionError::ParseFailure(
                "not a spreadsheet or delimited text file".to_string(),
            ))
        }
    };
    debug!(
        columns = table.column_count(),
        rows = table.row_count(),
        "decoded raw table"
    );
    Ok(table)
}

// ── Workbooks ─────────────────────────────────────────────────────────────────

/// Read the first worksheet of a workbook.
fn read_workbook(bytes: &[u8]) -> Result<RawTable, IngestionError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| IngestionError::ParseFailure(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(IngestionError::EmptySheet)?
        .map_err(|e| IngestionError::ParseFailure(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows.next().ok_or(IngestionError::EmptySheet)?;
    let headers = header
        .iter()
        .enumerate()
        .map(|(i, cell)| header_label(&convert_cell(cell), i))
        .collect();

    let rows = rows
        .map(|row| row.iter().map(convert_cell).collect::<Vec<_>>())
        .filter(|row| !row.iter().all(CellValue::is_empty))
        .collect();

    Ok(RawTable::new(headers, rows))
}

/// Map a calamine cell onto the raw cell model.
///
/// Date cells with a serial below one day are bare clock times; duration
/// formatted cells stay durations. Error cells read as empty.
pub fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) => text_cell(s),
        Data::DateTime(dt) if dt.is_duration() => dt
            .as_duration()
            .map(CellValue::Duration)
            .unwrap_or(CellValue::Empty),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) if (0.0..1.0).contains(&dt.as_f64()) => CellValue::Time(value.time()),
            Some(value) => CellValue::DateTime(value),
            None => CellValue::Empty,
        },
        Data::DateTimeIso(s) => {
            if let Some(t) = time_utils::parse_clock_time(s) {
                CellValue::Time(t)
            } else if let Some(dt) = time_utils::parse_datetime_generic(s) {
                CellValue::DateTime(dt)
            } else {
                text_cell(s)
            }
        }
        Data::DurationIso(s) => text_cell(s),
    }
}

// ── Delimited text ────────────────────────────────────────────────────────────

/// Decode as UTF-8 (BOM stripped), falling back to Latin-1 for legacy
/// Windows exports.
fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Pick the most frequent of `;`, `,` and tab in the header line.
pub fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or_default();
    [b';', b'\t', b',']
        .into_iter()
        .map(|d| (d, header.bytes().filter(|b| *b == d).count()))
        .filter(|(_, n)| *n > 0)
        .max_by_key(|(_, n)| *n)
        .map(|(d, _)| d)
        .unwrap_or(b',')
}

fn read_delimited(text: &str) -> Result<RawTable, IngestionError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(text))
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestionError::ParseFailure(e.to_string()))?
        .iter()
        .enumerate()
        .map(|(i, h)| header_label(&text_cell(h), i))
        .collect();

    if headers.is_empty() {
        return Err(IngestionError::EmptySheet);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestionError::ParseFailure(e.to_string()))?;
        let row: Vec<CellValue> = record.iter().map(text_cell).collect();
        if !row.iter().all(CellValue::is_empty) {
            rows.push(row);
        }
    }

    Ok(RawTable::new(headers, rows))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn text_cell(s: &str) -> CellValue {
    if s.trim().is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(s.to_string())
    }
}

/// Header text of a cell; blank headers become `unnamed: <index>`.
fn header_label(cell: &CellValue, index: usize) -> String {
    cell.to_text()
        .unwrap_or_else(|| format!("unnamed: {}", index))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
