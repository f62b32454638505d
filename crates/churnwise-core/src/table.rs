//! In-memory tabular dataset.
//!
//! A [`Table`] is a header plus string cells in file order. Column types are
//! inferred once per table so customer records can be rendered with numbers
//! where every non-missing value in the column is numeric.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::error::{CoreError, Result};

/// Cell values treated as missing.
pub const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

pub fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.iter().any(|m| *m == cell)
}

/// Parse a numeric cell, coercing anything non-numeric or non-finite to `0.0`.
pub fn coerce_number(cell: &str) -> f64 {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    kinds: Vec<ColumnKind>,
}

impl Table {
    /// Every row must have exactly one cell per header.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != headers.len() {
                return Err(CoreError::RaggedRow {
                    row: i,
                    expected: headers.len(),
                    got: row.len(),
                });
            }
        }
        let mut table = Self {
            headers,
            rows,
            kinds: Vec::new(),
        };
        table.infer_kinds();
        Ok(table)
    }

    fn infer_kinds(&mut self) {
        self.kinds = (0..self.headers.len())
            .map(|col| {
                let mut kind = ColumnKind::Integer;
                let mut any = false;
                for row in &self.rows {
                    let cell = row[col].as_str();
                    if is_missing(cell) {
                        continue;
                    }
                    any = true;
                    if kind == ColumnKind::Integer && cell.trim().parse::<i64>().is_err() {
                        kind = ColumnKind::Float;
                    }
                    if kind == ColumnKind::Float && cell.trim().parse::<f64>().is_err() {
                        kind = ColumnKind::Text;
                        break;
                    }
                }
                if any {
                    kind
                } else {
                    ColumnKind::Text
                }
            })
            .collect();
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_kind(&self, col: usize) -> Option<ColumnKind> {
        self.kinds.get(col).copied()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like [`column_index`](Table::column_index) but fails with a schema error.
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| CoreError::missing_column(name))
    }

    /// Iterate one column's cells in row order.
    pub fn column<'a>(&'a self, col: usize) -> impl Iterator<Item = &'a str> + 'a {
        self.rows.iter().map(move |r| r[col].as_str())
    }

    /// Drop every row holding a missing cell. Returns the number dropped.
    pub fn drop_incomplete(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !row.iter().any(|c| is_missing(c)));
        let dropped = before - self.rows.len();
        if dropped > 0 {
            self.infer_kinds();
        }
        dropped
    }

    /// First row (in file order) whose `column` equals `value`.
    pub fn find_first(&self, column: &str, value: &str) -> Result<Option<Record>> {
        let col = self.require_column(column)?;
        Ok(self
            .rows
            .iter()
            .position(|row| row[col] == value)
            .map(|i| self.record(i)))
    }

    /// Owned, typed view of row `i`. Panics if `i` is out of range.
    pub fn record(&self, i: usize) -> Record {
        let fields = self
            .headers
            .iter()
            .zip(&self.rows[i])
            .zip(&self.kinds)
            .map(|((h, cell), kind)| (h.clone(), typed_value(cell, *kind)))
            .collect();
        Record { fields }
    }
}

fn typed_value(cell: &str, kind: ColumnKind) -> Value {
    if kind != ColumnKind::Text && is_missing(cell) {
        return Value::Null;
    }
    match kind {
        ColumnKind::Integer => cell
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::Null),
        ColumnKind::Float => cell
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ColumnKind::Text => Value::String(cell.to_string()),
    }
}

/// One customer row, serialized as an object in header order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub fields: Vec<(String, Value)>,
}

impl Record {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
