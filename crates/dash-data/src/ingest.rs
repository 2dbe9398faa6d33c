//! Ingestion and normalization of uploaded spreadsheets.
//!
//! [`load`] converts file bytes into a [`LoadedTable`]: labels lower-cased
//! and trimmed, the third column turned into a time axis, and text columns
//! coerced to numbers. Unparseable cells become missing values; only
//! structural problems (unreadable bytes, too few columns, an unreadable
//! time column) are errors.

use chrono::NaiveDateTime;
use dash_core::error::IngestionError;
use dash_core::models::{
    CellValue, CleanTable, Column, ColumnData, LoadedTable, RawTable, TimeAxis, TIME_SOURCE_INDEX,
};
use dash_core::time_utils;
use tracing::{debug, warn};

use crate::reader;

/// Decode and clean `bytes`.
pub fn load(bytes: &[u8]) -> Result<LoadedTable, IngestionError> {
    let raw = reader::read_raw_table(bytes)?;
    clean(&raw)
}

/// Clean an already decoded table.
pub fn clean(raw: &RawTable) -> Result<LoadedTable, IngestionError> {
    if raw.column_count() <= TIME_SOURCE_INDEX {
        return Err(IngestionError::MissingTimeColumn {
            found: raw.column_count(),
        });
    }
    if raw.row_count() == 0 {
        return Err(IngestionError::EmptySheet);
    }

    let time_label = &raw.headers[TIME_SOURCE_INDEX];
    let axis = build_time_axis(time_label, &raw.column(TIME_SOURCE_INDEX))?;

    let columns: Vec<Column> = raw
        .headers
        .iter()
        .enumerate()
        .map(|(i, label)| clean_column(normalize_label(label), &raw.column(i)))
        .collect();

    let table = CleanTable::new(columns, axis);
    debug!(
        rows = table.row_count(),
        columns = table.columns().len(),
        mode = ?table.axis_mode(),
        missing_times = table.axis().missing_count(),
        "ingested table"
    );
    Ok(LoadedTable::new(table))
}

/// Lower-case and trim a column label.
pub fn normalize_label(label: &str) -> String {
    label.to_lowercase().trim().to_string()
}

// ── Time axis ─────────────────────────────────────────────────────────────────

/// Decide the axis mode for the whole column and build the axis.
///
/// Clock-time parsing is tried first (strict `HH:MM:SS`, then generic
/// date/time parsing if the strict pass found nothing). Only when no row at
/// all parses as a clock time does the column switch to elapsed minutes.
pub fn build_time_axis(label: &str, cells: &[&CellValue]) -> Result<TimeAxis, IngestionError> {
    let mut clock = parse_clock_column(cells);
    if count_present(&clock) == 0 {
        clock = parse_generic_column(cells);
    }

    let parsed = count_present(&clock);
    if parsed > 0 {
        let filled = cells.iter().filter(|c| !c.is_empty()).count();
        if parsed * 2 < filled {
            warn!(
                column = label,
                parsed,
                filled,
                "most time values are unreadable; keeping absolute time axis"
            );
        }
        return Ok(TimeAxis::absolute(clock));
    }

    let minutes: Vec<Option<f64>> = cells.iter().map(|c| elapsed_minutes(c)).collect();
    if count_present(&minutes) == 0 {
        return Err(IngestionError::UnreadableTimeAxis(label.to_string()));
    }
    debug!(column = label, "time column read as elapsed minutes");
    Ok(TimeAxis::elapsed(minutes))
}

/// Strict `HH:MM:SS` pass.
///
/// When the first filled cell is a typed clock time, every cell goes through
/// its `HH:MM:SS` text form; otherwise typed date-times pass through and text
/// is matched against the pattern directly.
fn parse_clock_column(cells: &[&CellValue]) -> Vec<Option<NaiveDateTime>> {
    let typed_times = cells
        .iter()
        .find(|c| !c.is_empty())
        .is_some_and(|c| matches!(c, CellValue::Time(_)));

    cells
        .iter()
        .map(|cell| {
            if typed_times {
                return cell
                    .to_text()
                    .and_then(|s| time_utils::parse_clock_time(&s))
                    .map(time_utils::on_base_date);
            }
            match cell {
                CellValue::DateTime(dt) => Some(*dt),
                CellValue::Time(t) => Some(time_utils::on_base_date(*t)),
                CellValue::Text(s) => {
                    time_utils::parse_clock_time(s).map(time_utils::on_base_date)
                }
                _ => None,
            }
        })
        .collect()
}

/// Unconstrained date/time pass.
fn parse_generic_column(cells: &[&CellValue]) -> Vec<Option<NaiveDateTime>> {
    cells
        .iter()
        .map(|cell| match cell {
            CellValue::DateTime(dt) => Some(*dt),
            CellValue::Time(t) => Some(time_utils::on_base_date(*t)),
            CellValue::Text(s) => time_utils::parse_datetime_generic(s),
            _ => None,
        })
        .collect()
}

/// A cell read as an elapsed duration, in minutes.
fn elapsed_minutes(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Empty => None,
        CellValue::Duration(d) => Some(d.num_milliseconds() as f64 / 60_000.0),
        other => other
            .to_text()
            .and_then(|s| time_utils::parse_elapsed_minutes(&s)),
    }
}

fn count_present<T>(values: &[Option<T>]) -> usize {
    values.iter().filter(|v| v.is_some()).count()
}

// ── Data columns ──────────────────────────────────────────────────────────────

/// Type a data column.
///
/// All-number columns pass through, all-boolean columns become 0/1 and
/// all-date-time columns stay temporal. Anything else is text and goes
/// through [`coerce_numeric`] cell by cell.
pub fn clean_column(name: String, cells: &[&CellValue]) -> Column {
    let filled: Vec<&CellValue> = cells.iter().copied().filter(|c| !c.is_empty()).collect();

    let data = if filled.iter().all(|c| matches!(c, CellValue::Number(_))) {
        ColumnData::Numeric(
            cells
                .iter()
                .map(|c| match c {
                    CellValue::Number(n) if !n.is_nan() => Some(*n),
                    _ => None,
                })
                .collect(),
        )
    } else if filled.iter().all(|c| matches!(c, CellValue::Bool(_))) {
        ColumnData::Numeric(
            cells
                .iter()
                .map(|c| match c {
                    CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                    _ => None,
                })
                .collect(),
        )
    } else if filled.iter().all(|c| matches!(c, CellValue::DateTime(_))) {
        ColumnData::Temporal(
            cells
                .iter()
                .map(|c| match c {
                    CellValue::DateTime(dt) => Some(*dt),
                    _ => None,
                })
                .collect(),
        )
    } else {
        ColumnData::Numeric(
            cells
                .iter()
                .map(|c| c.to_text().and_then(|s| coerce_numeric(&s)))
                .collect(),
        )
    };

    Column { name, data }
}

/// Parse a decimal written with either `,` or `.` as separator.
///
/// Returns `None` for anything that is not a number.
pub fn coerce_numeric(text: &str) -> Option<f64> {
    text.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
