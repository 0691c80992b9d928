//! Backend-independent sheet model.
//!
//! Builders only ever append rows to a [`SheetDefinition`]; the xlsx and csv
//! backends turn the finished workbook into bytes.

use serde_json::Value;

use crate::flatten::element_text;
use crate::style::CellRole;

/// Largest integer an `f64` holds exactly.
const MAX_EXACT_INTEGER: u64 = 1 << 53;

/// A renderable scalar.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Text form used by the csv backend and by tests.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => b.to_string(),
        }
    }
}

impl From<&Value> for CellValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Empty,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) if exceeds_f64_precision(n) => CellValue::Text(n.to_string()),
            Value::Number(n) => match n.as_f64() {
                Some(f) if f.is_finite() => CellValue::Number(f),
                _ => CellValue::Text(n.to_string()),
            },
            Value::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(element_text(other)),
        }
    }
}

/// Integers beyond 2^53 (long ids, account numbers) keep their digits as text.
fn exceeds_f64_precision(n: &serde_json::Number) -> bool {
    if let Some(i) = n.as_i64() {
        i.unsigned_abs() > MAX_EXACT_INTEGER
    } else {
        n.as_u64().is_some_and(|u| u > MAX_EXACT_INTEGER)
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

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub role: CellRole,
}

impl Cell {
    pub fn new(value: impl Into<CellValue>, role: CellRole) -> Self {
        Self {
            value: value.into(),
            role,
        }
    }
}

pub type Row = Vec<Cell>;

/// One worksheet worth of rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetDefinition {
    pub name: String,
    pub title: Option<String>,
    pub rows: Vec<Row>,
    /// Rows above this index stay visible while scrolling.
    pub frozen_rows: Option<u32>,
}

impl SheetDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.is_empty())
    }

    /// Append a title row and remember it as the sheet title.
    pub fn push_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        self.rows
            .push(vec![Cell::new(title.as_str(), CellRole::Title)]);
        if self.title.is_none() {
            self.title = Some(title);
        }
    }

    /// Append a header row of column labels.
    pub fn push_header<I, S>(&mut self, labels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row = labels
            .into_iter()
            .map(|label| Cell::new(label.into(), CellRole::Header))
            .collect();
        self.rows.push(row);
    }

    pub fn push_section_header(&mut self, name: impl Into<String>) {
        self.rows
            .push(vec![Cell::new(name.into(), CellRole::SectionHeader)]);
    }

    /// Append a two-column label/value row.
    pub fn push_field(&mut self, label: impl Into<String>, value: &Value) {
        self.rows.push(vec![
            Cell::new(label.into(), CellRole::Label),
            Cell::new(CellValue::from(value), CellRole::Value),
        ]);
    }

    /// Append a row of data cells.
    pub fn push_values<'a, I>(&mut self, values: I)
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let row = values
            .into_iter()
            .map(|v| Cell::new(CellValue::from(v), CellRole::Value))
            .collect();
        self.rows.push(row);
    }

    pub fn push_note(&mut self, text: impl Into<String>) {
        self.rows.push(vec![Cell::new(text.into(), CellRole::Note)]);
    }

    /// Append an empty separator row unless the sheet is empty or already
    /// ends with one.
    pub fn push_blank(&mut self) {
        if self.rows.last().is_some_and(|row| !row.is_empty()) {
            self.rows.push(Vec::new());
        }
    }

    /// Freeze everything up to and including the most recent row, unless a
    /// freeze boundary is already set.
    pub fn freeze_through_last_row(&mut self) {
        if self.frozen_rows.is_none() {
            self.frozen_rows = Some(self.rows.len() as u32);
        }
    }

    /// Text of every cell, row by row. Mostly useful in assertions.
    pub fn text_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|c| c.value.as_text()).collect())
            .collect()
    }
}
