use crate::cell::CellValue;

/// One input row: an insertion-ordered map from column name to cell.
///
/// Immutable for the duration of a build call. Insertion order matters only
/// when the case-insensitive probe in [`Row::get`] matches several keys; the
/// first inserted match wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        self.cells.push((column.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn raw(&self, key: &str) -> Option<&CellValue> {
        self.cells
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Look up a column, tolerating common header hygiene problems.
    ///
    /// Probing order is a documented contract the builders depend on:
    /// 1. exact key,
    /// 2. key with one trailing space,
    /// 3. key with one leading space,
    /// 4. case-insensitive match against every key, in insertion order.
    ///
    /// A matched key short-circuits even when its value is absent; later
    /// variants are not consulted. The returned value is cleaned (trimmed,
    /// sentinel markers mapped to `None`).
    pub fn get(&self, column: &str) -> Option<CellValue> {
        if let Some(value) = self.raw(column) {
            return value.clean();
        }
        if let Some(value) = self.raw(&format!("{column} ")) {
            return value.clean();
        }
        if let Some(value) = self.raw(&format!(" {column}")) {
            return value.clean();
        }
        self.cells
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .and_then(|(_, value)| value.clean())
    }

    /// Cleaned text of a column, if the cell holds text.
    pub fn get_str(&self, column: &str) -> Option<String> {
        match self.get(column)? {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

/// Format a bracket-indexed column name (`NumeroLinea[3]`).
pub fn indexed(base: &str, i: usize) -> String {
    format!("{base}[{i}]")
}

/// Format a doubly-indexed column name (`MontoSubDescuento[2][1]`).
pub fn indexed2(base: &str, i: usize, j: usize) -> String {
    format!("{base}[{i}][{j}]")
}

/// Collect present values of `base[1]..base[max]` in index order.
///
/// A missing index contributes nothing but does not stop the scan; real
/// spreadsheets leave gaps in repeating groups.
pub fn collect_indexed(row: &Row, base: &str, max: usize) -> Vec<CellValue> {
    let mut out = Vec::new();
    for i in 1..=max {
        if let Some(value) = row.get(&indexed(base, i)) {
            out.push(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_wins() {
        let row = Row::from_iter([("RNCEmisor", "123")]);
        assert_eq!(row.get("RNCEmisor"), Some(CellValue::from("123")));
    }

    #[test]
    fn trailing_space_header() {
        let row = Row::from_iter([("RNCEmisor ", "123")]);
        assert_eq!(row.get("RNCEmisor"), Some(CellValue::from("123")));
    }

    #[test]
    fn leading_space_header() {
        let row = Row::from_iter([(" RNCEmisor", "123")]);
        assert_eq!(row.get("RNCEmisor"), Some(CellValue::from("123")));
    }

    #[test]
    fn case_insensitive_fallback() {
        let row = Row::from_iter([("rncemisor", "123")]);
        assert_eq!(row.get("RNCEmisor"), Some(CellValue::from("123")));
    }

    #[test]
    fn exact_sentinel_short_circuits() {
        // An exact key holding a sentinel resolves to absent even when a
        // spaced variant carries a real value.
        let row = Row::from_iter([("Municipio", "#e"), ("Municipio ", "010100")]);
        assert_eq!(row.get("Municipio"), None);
    }

    #[test]
    fn missing_column_is_none() {
        let row = Row::from_iter([("RNCEmisor", "123")]);
        assert_eq!(row.get("RNCComprador"), None);
    }

    #[test]
    fn collect_indexed_tolerates_gaps() {
        let row = Row::from_iter([
            ("TelefonoEmisor[1]", "809-555-0001"),
            ("TelefonoEmisor[3]", "809-555-0003"),
        ]);
        let values = collect_indexed(&row, "TelefonoEmisor", 10);
        assert_eq!(
            values,
            vec![
                CellValue::from("809-555-0001"),
                CellValue::from("809-555-0003"),
            ]
        );
    }

    #[test]
    fn indexed_key_formatting() {
        assert_eq!(indexed("NumeroLinea", 3), "NumeroLinea[3]");
        assert_eq!(indexed2("MontoSubDescuento", 2, 1), "MontoSubDescuento[2][1]");
    }
}
