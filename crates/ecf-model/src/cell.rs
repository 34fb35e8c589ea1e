use serde::{Deserialize, Serialize};

/// Sentinel tokens spreadsheets use to mark an intentionally empty cell.
///
/// Matched verbatim after trimming. The set is deliberately not case-folded:
/// `"NULL"` and `"null"` are absent, `"Null"` is a present value.
pub const EMPTY_MARKERS: [&str; 5] = ["#e", "#E", "NULL", "null", ""];

/// One cell of an input row.
///
/// Spreadsheet exports mix strings, numbers, and booleans in the same
/// column, and use NaN for missing numeric cells. Modeling cells as a
/// tagged variant keeps [`CellValue::is_absent`] and [`CellValue::clean`]
/// exhaustive matches instead of runtime type probing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Absent,
}

impl CellValue {
    /// True for missing cells, NaN numbers, and sentinel-marked strings.
    pub fn is_absent(&self) -> bool {
        match self {
            CellValue::Absent => true,
            CellValue::Number(n) => n.is_nan(),
            CellValue::Text(s) => EMPTY_MARKERS.contains(&s.trim()),
            CellValue::Bool(_) => false,
        }
    }

    /// Loose truth test for cells that gate conditional blocks.
    ///
    /// Absent cells, NaN, numeric zero, `false`, and blank text are false;
    /// any other value is true, including the text `"0"`.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Absent => false,
            CellValue::Number(n) => !n.is_nan() && *n != 0.0,
            CellValue::Text(s) => !s.trim().is_empty(),
            CellValue::Bool(b) => *b,
        }
    }

    /// Returns `None` for absent cells; text values come back trimmed.
    pub fn clean(&self) -> Option<CellValue> {
        if self.is_absent() {
            return None;
        }
        match self {
            CellValue::Text(s) => Some(CellValue::Text(s.trim().to_string())),
            other => Some(other.clone()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}
