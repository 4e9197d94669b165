use crate::field::FieldValue;

/// One parsed row, keyed by its column header, in column order.
///
/// `None` marks a cell the source left empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: Vec<(String, Option<FieldValue>)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a row from text cells, as CSV sources produce them.
    pub fn from_text<K, V, I>(cells: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut row = Self::new();
        for (key, value) in cells {
            row.push(key, Some(FieldValue::Text(value.into())));
        }
        row
    }

    /// Appends a cell. Keys are trimmed and blank text becomes an empty cell;
    /// a later cell under the same key replaces the earlier one.
    pub fn push(&mut self, key: impl Into<String>, value: Option<FieldValue>) {
        let key = key.into().trim().to_string();
        let value = value.filter(|v| !v.is_blank());
        match self.cells.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((key, value)),
        }
    }

    /// The cell under `key`, if it holds content.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.cells
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_ref())
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, Option<&FieldValue>)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// True when at least one cell, stringified and trimmed, is non-empty.
    pub fn has_content(&self) -> bool {
        self.cells
            .iter()
            .any(|(_, v)| v.as_ref().is_some_and(|v| !v.to_string().trim().is_empty()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
