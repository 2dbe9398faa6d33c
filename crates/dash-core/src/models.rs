use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Semantic name of the time axis column in every [`CleanTable`].
pub const AXIS_COLUMN: &str = "Tempo";

/// Zero-based position of the raw time source in every [`RawTable`].
pub const TIME_SOURCE_INDEX: usize = 2;

// ── Raw side ──────────────────────────────────────────────────────────────────

/// A single cell as it was decoded from the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// A time-of-day without a date (Excel time-formatted cells).
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    /// An elapsed duration (Excel `[h]:mm:ss` cells).
    Duration(TimeDelta),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// String form used when a cell has to be re-read as text.
    ///
    /// Numbers print without a trailing `.0` for integral values, times as
    /// `HH:MM:SS`, durations as `D days HH:MM:SS`. `Empty` yields `None`.
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                n.to_string()
            }),
            CellValue::Bool(b) => Some(if *b { "True" } else { "False" }.to_string()),
            CellValue::Time(t) => Some(t.format("%H:%M:%S").to_string()),
            CellValue::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            CellValue::Duration(d) => Some(crate::time_utils::format_duration(*d)),
        }
    }
}

/// Header row plus data rows exactly as decoded from a spreadsheet.
///
/// Labels are not guaranteed unique, trimmed or lower-cased. Rows shorter
/// than the header are padded with [`CellValue::Empty`] on access.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { headers, rows }
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// All cells of column `index`, padding ragged rows with `Empty`.
    pub fn column(&self, index: usize) -> Vec<&CellValue> {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .iter()
            .map(|row| row.get(index).unwrap_or(&EMPTY))
            .collect()
    }
}

// ── Clean side ────────────────────────────────────────────────────────────────

/// What the x-axis of every chart built from a table represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeAxisMode {
    /// Wall-clock time of day, formatted `HH:MM:SS`.
    AbsoluteTime,
    /// Minutes elapsed since an arbitrary start.
    ElapsedMinutes,
}

/// Values of the designated time axis.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisValues {
    Absolute(Vec<Option<NaiveDateTime>>),
    Elapsed(Vec<Option<f64>>),
}

/// The time axis of a [`CleanTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    pub name: String,
    pub values: AxisValues,
}

impl TimeAxis {
    pub fn absolute(values: Vec<Option<NaiveDateTime>>) -> Self {
        Self {
            name: AXIS_COLUMN.to_string(),
            values: AxisValues::Absolute(values),
        }
    }

    pub fn elapsed(values: Vec<Option<f64>>) -> Self {
        Self {
            name: AXIS_COLUMN.to_string(),
            values: AxisValues::Elapsed(values),
        }
    }

    pub fn mode(&self) -> TimeAxisMode {
        match self.values {
            AxisValues::Absolute(_) => TimeAxisMode::AbsoluteTime,
            AxisValues::Elapsed(_) => TimeAxisMode::ElapsedMinutes,
        }
    }

    pub fn len(&self) -> usize {
        match &self.values {
            AxisValues::Absolute(v) => v.len(),
            AxisValues::Elapsed(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of rows whose axis value is missing.
    pub fn missing_count(&self) -> usize {
        match &self.values {
            AxisValues::Absolute(v) => v.iter().filter(|x| x.is_none()).count(),
            AxisValues::Elapsed(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }

    /// Axis values as plot coordinates.
    ///
    /// Absolute times become seconds since the Unix epoch (see
    /// [`crate::time_utils::datetime_to_axis`]); elapsed values stay minutes.
    pub fn coordinates(&self) -> Vec<Option<f64>> {
        match &self.values {
            AxisValues::Absolute(v) => v
                .iter()
                .map(|x| x.map(crate::time_utils::datetime_to_axis))
                .collect(),
            AxisValues::Elapsed(v) => v.clone(),
        }
    }
}

/// Typed storage of a cleaned data column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// `None` is the missing-value marker.
    Numeric(Vec<Option<f64>>),
    Temporal(Vec<Option<NaiveDateTime>>),
}

/// A cleaned, lower-cased data column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            ColumnData::Temporal(_) => None,
        }
    }
}

/// Cleaned table ready for charting. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanTable {
    columns: Vec<Column>,
    axis: TimeAxis,
}

impl CleanTable {
    pub fn new(columns: Vec<Column>, axis: TimeAxis) -> Self {
        Self { columns, axis }
    }

    pub fn axis(&self) -> &TimeAxis {
        &self.axis
    }

    pub fn axis_mode(&self) -> TimeAxisMode {
        self.axis.mode()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.axis.len()
    }

    /// Every label in table order, the axis column last.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(|c| c.name.as_str())
            .chain(std::iter::once(self.axis.name.as_str()))
            .collect()
    }

    /// First data column labelled `name`.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Numeric values of the first column labelled `name`.
    pub fn numeric(&self, name: &str) -> Option<&[Option<f64>]> {
        self.column(name).and_then(Column::as_numeric)
    }
}

/// Output of the ingestion routine: the table plus its axis column name.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    pub table: CleanTable,
    pub axis_column: String,
}

impl LoadedTable {
    pub fn new(table: CleanTable) -> Self {
        let axis_column = table.axis().name.clone();
        Self { table, axis_column }
    }

    pub fn axis_mode(&self) -> TimeAxisMode {
        self.table.axis_mode()
    }
}
