//! Ordered JSON object construction.
//!
//! The DGII validator is sensitive to sibling key order in the identity,
//! totals, and line-item substructures, so documents are assembled through
//! an explicit builder over `serde_json::Map` (insertion-ordered via the
//! `preserve_order` feature) instead of ad hoc map mutation.

use ecf_model::CellValue;
use serde_json::{Map, Value};

/// Insertion-ordered JSON object under construction.
#[derive(Debug, Default)]
pub struct ObjectBuilder {
    map: Map<String, Value>,
}

impl ObjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconditional insert.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.map.insert(key.to_string(), value.into());
    }

    /// Insert only when the value is present; absent fields are omitted,
    /// never emitted as null.
    pub fn add_if(&mut self, key: &str, value: Option<impl Into<Value>>) {
        if let Some(value) = value {
            self.map.insert(key.to_string(), value.into());
        }
    }

    /// Insert a row cell passthrough: the original string or number,
    /// presence-filtered but otherwise unmodified.
    pub fn add_cell(&mut self, key: &str, cell: Option<CellValue>) {
        if let Some(cell) = cell {
            self.map.insert(key.to_string(), cell_to_value(cell));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn build(self) -> Value {
        Value::Object(self.map)
    }

    /// The built object, or `None` when no field resolved. Conditional
    /// blocks use this so empty sections disappear entirely.
    pub fn build_nonempty(self) -> Option<Value> {
        if self.map.is_empty() {
            None
        } else {
            Some(Value::Object(self.map))
        }
    }
}

/// Map a cell to its JSON form. Integral floats collapse to JSON integers
/// so a spreadsheet `32.0` does not serialize as `32.0`.
pub fn cell_to_value(cell: CellValue) -> Value {
    match cell {
        CellValue::Text(s) => Value::String(s),
        CellValue::Number(n) => number_value(n),
        CellValue::Bool(b) => Value::Bool(b),
        CellValue::Absent => Value::Null,
    }
}

fn number_value(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order() {
        let mut builder = ObjectBuilder::new();
        builder.set("MontoTotal", "500");
        builder.set("TotalITBISRetenido", "90");
        builder.set("MontoNoFacturable", "0");
        let json = serde_json::to_string(&builder.build()).expect("serialize");
        let total = json.find("MontoTotal").expect("MontoTotal");
        let retained = json.find("TotalITBISRetenido").expect("retenido");
        assert!(total < retained);
    }

    #[test]
    fn absent_fields_are_omitted() {
        let mut builder = ObjectBuilder::new();
        builder.add_cell("RNCComprador", None);
        builder.add_if("Estado", None::<String>);
        assert!(builder.is_empty());
        assert_eq!(builder.build_nonempty(), None);
    }

    #[test]
    fn integral_floats_collapse() {
        assert_eq!(cell_to_value(CellValue::Number(32.0)), Value::from(32));
        assert_eq!(
            cell_to_value(CellValue::Number(0.18)),
            serde_json::json!(0.18)
        );
    }
}
