//! Numeric coercion helpers.
//!
//! Two serialization conventions coexist: the ECF/ACECF family carries
//! amounts as text, while the RFCE endpoint requires native integers. They
//! are kept as distinct function families (`format_amount` vs
//! [`value_to_amount_int`]); the divergence is part of the external schema,
//! not something to unify.

use ecf_model::{BuildError, CellValue, Result};
use serde_json::Value;

/// Lenient integer read: integer parse first, then float parse truncated.
/// Used for presence tests and indicator fallbacks.
pub fn to_int(cell: &CellValue) -> Option<i64> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Some(n.trunc() as i64),
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if let Ok(n) = trimmed.parse::<i64>() {
                return Some(n);
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(|n| n.trunc() as i64)
        }
        CellValue::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// Strict integer read for columns the schema types as numeric: a present
/// but unparseable value is an error, never a silent default.
pub fn require_int(column: &str, cell: &CellValue) -> Result<i64> {
    to_int(cell).ok_or_else(|| BuildError::MalformedNumber {
        column: column.to_string(),
        value: cell_display(cell),
    })
}

/// Parse a monetary amount, tolerating thousands separators. `None` on
/// failure; threshold decisions treat that as "below threshold".
pub fn parse_amount(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) if n.is_finite() => Some(*n),
        CellValue::Text(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }
}

/// Render an amount as a string, dropping a superfluous trailing `.0`:
/// `250000.0` becomes `"250000"`, `250000.5` stays `"250000.5"` (Rust's
/// default `f64` display). An unparseable text cell falls back to the raw
/// string rather than failing.
pub fn format_amount(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(s) => match s.trim().parse::<f64>() {
            Ok(n) => Some(render_amount(n)),
            Err(_) => Some(s.trim().to_string()),
        },
        CellValue::Number(n) if n.is_finite() => Some(render_amount(*n)),
        CellValue::Bool(b) => Some(i64::from(*b).to_string()),
        _ => None,
    }
}

fn render_amount(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        (n as i64).to_string()
    } else {
        format!("{n}")
    }
}

/// Render an approval-state code as an integer string; an unparseable
/// value passes through unchanged.
pub fn format_state(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(s) => match s.trim().parse::<f64>() {
            Ok(n) => Some((n as i64).to_string()),
            Err(_) => Some(s.trim().to_string()),
        },
        CellValue::Number(n) if n.is_finite() => Some((*n as i64).to_string()),
        CellValue::Bool(b) => Some(i64::from(*b).to_string()),
        _ => None,
    }
}

/// RFCE amount coercion: string or number to a native integer, rounding
/// half away from zero (`180.5` becomes `181`; a half-to-even scheme would
/// give `180`). Unparseable values coerce to 0; the RFCE endpoint rejects
/// floats like `10100.0` outright.
pub fn value_to_amount_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_f64().map(|f| f.round() as i64).unwrap_or(0),
        Value::String(s) => s
            .trim()
            .replace(',', "")
            .parse::<f64>()
            .map(|f| f.round() as i64)
            .unwrap_or(0),
        _ => 0,
    }
}

/// RFCE code coercion: the integer part of a string or number, 0 on failure.
pub fn value_to_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)).unwrap_or(0),
        Value::String(s) => {
            let integral = s.trim().replace(',', "");
            let integral = integral.split('.').next().unwrap_or("");
            integral.parse::<i64>().unwrap_or(0)
        }
        _ => 0,
    }
}

fn cell_display(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(s) => s.clone(),
        CellValue::Number(n) => format!("{n}"),
        CellValue::Bool(b) => b.to_string(),
        CellValue::Absent => String::new(),
    }
}
