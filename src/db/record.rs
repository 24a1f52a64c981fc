//! Untyped rows for tables that are copied column by column.

use crate::error::{ImportError, ImportResult};
use rusqlite::types::Value;

/// A row as an ordered list of `(column, value)` pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    table: String,
    columns: Vec<(String, Value)>,
}

impl Record {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
        }
    }

    /// Read every column of a result row.
    pub fn from_row(table: &str, row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        let stmt: &rusqlite::Statement<'_> = row.as_ref();
        let mut columns = Vec::with_capacity(stmt.column_count());
        for idx in 0..stmt.column_count() {
            let name = stmt.column_name(idx)?.to_string();
            columns.push((name, row.get::<_, Value>(idx)?));
        }
        Ok(Self {
            table: table.to_string(),
            columns,
        })
    }

    /// Add a column, or replace it in place when it already exists.
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.set(column, value.into());
        self
    }

    pub fn set(&mut self, column: &str, value: Value) {
        match self.columns.iter_mut().find(|(name, _)| name == column) {
            Some((_, slot)) => *slot = value,
            None => self.columns.push((column.to_string(), value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Remove a column and return its value.
    pub fn take(&mut self, column: &str) -> Option<Value> {
        let idx = self.columns.iter().position(|(name, _)| name == column)?;
        Some(self.columns.remove(idx).1)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.columns.iter().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Primary key for log lines, when the row has one.
    pub fn id(&self) -> Option<i64> {
        self.get("id").and_then(integer)
    }

    fn value(&self, column: &str) -> ImportResult<&Value> {
        self.get(column).ok_or_else(|| ImportError::MissingColumn {
            table: self.table.clone(),
            column: column.to_string(),
        })
    }

    fn null(&self, column: &str) -> ImportError {
        ImportError::NullValue {
            table: self.table.clone(),
            column: column.to_string(),
        }
    }

    fn invalid(&self, column: &str, expected: &'static str) -> ImportError {
        ImportError::InvalidValue {
            table: self.table.clone(),
            column: column.to_string(),
            expected,
        }
    }

    /// Read an epoch timestamp column, accepting integer, real or numeric
    /// text. Fractional seconds are dropped. `Ok(None)` for NULL.
    pub fn epoch(&self, column: &str) -> ImportResult<Option<i64>> {
        match self.value(column)? {
            Value::Null => Ok(None),
            value => integer(value).map(Some).ok_or_else(|| ImportError::NotATimestamp {
                table: self.table.clone(),
                column: column.to_string(),
            }),
        }
    }

    /// Like [`Record::epoch`], but NULL is an error.
    pub fn timestamp(&self, column: &str) -> ImportResult<i64> {
        self.epoch(column)?.ok_or_else(|| self.null(column))
    }

    pub fn opt_int(&self, column: &str) -> ImportResult<Option<i64>> {
        match self.value(column)? {
            Value::Null => Ok(None),
            value => integer(value)
                .map(Some)
                .ok_or_else(|| self.invalid(column, "integer")),
        }
    }

    pub fn int(&self, column: &str) -> ImportResult<i64> {
        self.opt_int(column)?.ok_or_else(|| self.null(column))
    }

    pub fn real(&self, column: &str) -> ImportResult<f64> {
        match self.value(column)? {
            Value::Null => Err(self.null(column)),
            Value::Integer(value) => Ok(*value as f64),
            Value::Real(value) => Ok(*value),
            Value::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| self.invalid(column, "number")),
            Value::Blob(_) => Err(self.invalid(column, "number")),
        }
    }

    /// Text column. Numbers are rendered as text, blobs must be UTF-8.
    pub fn opt_text(&self, column: &str) -> ImportResult<Option<String>> {
        match self.value(column)? {
            Value::Null => Ok(None),
            Value::Text(text) => Ok(Some(text.clone())),
            Value::Integer(value) => Ok(Some(value.to_string())),
            Value::Real(value) => Ok(Some(value.to_string())),
            Value::Blob(bytes) => String::from_utf8(bytes.clone())
                .map(Some)
                .map_err(|_| self.invalid(column, "UTF-8 text")),
        }
    }

    pub fn text(&self, column: &str) -> ImportResult<String> {
        self.opt_text(column)?.ok_or_else(|| self.null(column))
    }
}

/// Integers as-is, reals truncated toward zero, numeric text parsed.
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(value) => Some(*value),
        Value::Real(value) if value.is_finite() => Some(value.trunc() as i64),
        Value::Text(text) => {
            let text = text.trim();
            text.parse::<i64>().ok().or_else(|| {
                text.parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .map(|value| value.trunc() as i64)
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let record = Record::new("tbl_star")
            .with("user_id", 1_i64)
            .with("object_id", 2_i64)
            .with("user_id", 3_i64);

        assert_eq!(record.len(), 2);
        assert_eq!(record.columns().collect::<Vec<_>>(), vec!["user_id", "object_id"]);
        assert_eq!(record.get("user_id"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_take_removes_column() {
        let mut record = Record::new("tbl_rating").with("create_time", 10_i64);
        assert_eq!(record.take("create_time"), Some(Value::Integer(10)));
        assert!(record.is_empty());
        assert_eq!(record.take("create_time"), None);
    }

    #[test]
    fn test_epoch_variants() {
        let record = Record::new("tbl_user_badge")
            .with("a", 1700000000_i64)
            .with("b", Value::Null)
            .with("c", "1700000000".to_string())
            .with("d", "yesterday".to_string());

        assert_eq!(record.epoch("a").unwrap(), Some(1700000000));
        assert_eq!(record.epoch("b").unwrap(), None);
        assert_eq!(record.epoch("c").unwrap(), Some(1700000000));
        assert!(record.epoch("d").is_err());
        assert!(matches!(
            record.epoch("missing"),
            Err(ImportError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_epoch_truncates_fractional_seconds() {
        let record = Record::new("tbl_wiki")
            .with("create_time", 1700000000.5_f64)
            .with("update_time", "1700000000.9".to_string());

        assert_eq!(record.epoch("create_time").unwrap(), Some(1700000000));
        assert_eq!(record.timestamp("update_time").unwrap(), 1700000000);
    }

    #[test]
    fn test_typed_accessors() {
        let record = Record::new("tbl_comment")
            .with("id", 7_i64)
            .with("object_id", "12".to_string())
            .with("title", Value::Null)
            .with("content", Value::Null)
            .with("rating", 3_i64)
            .with("status", "active".to_string());

        assert_eq!(record.int("object_id").unwrap(), 12);
        assert_eq!(record.opt_text("title").unwrap(), None);
        assert_eq!(record.real("rating").unwrap(), 3.0);
        assert_eq!(record.text("id").unwrap(), "7");
        assert!(matches!(
            record.text("content"),
            Err(ImportError::NullValue { .. })
        ));
        assert!(matches!(
            record.int("status"),
            Err(ImportError::InvalidValue { expected: "integer", .. })
        ));
        assert!(matches!(
            record.timestamp("content"),
            Err(ImportError::NullValue { .. })
        ));
    }
}
