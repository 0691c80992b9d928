//! Shared sheet layout used by every type-specific builder.
//!
//! A layout names the summary sheet, the sections rendered on it, and the
//! array fields that get a table sheet of their own. Top-level arrays of
//! objects the layout does not mention still get a table sheet, named after
//! the field.
//!
//! When `data` itself is an array of objects it feeds the first declared
//! table; any other non-object payload is kept as a raw block on the summary.

use serde_json::{Map, Value};
use tracing::debug;

use crate::document::ExtractedRecord;
use crate::flatten::flatten;
use crate::sections::{Section, render_key_values, render_sections};
use crate::sheet::SheetDefinition;
use crate::table::{NO_DATA, TableOptions, build_table};
use crate::title::format_title;

use super::fallback::push_raw_data;

pub(crate) const DOCUMENT_INFORMATION: &str = "Document Information";

/// A table sheet fed by the first present field in `fields`.
pub(crate) struct TableSpec {
    pub sheet: &'static str,
    pub fields: &'static [&'static str],
    pub order: &'static [&'static str],
}

pub(crate) struct Layout {
    pub summary_sheet: &'static str,
    /// `(section name, prefix)` pairs in rendering order.
    pub sections: &'static [(&'static str, &'static str)],
    pub tables: &'static [TableSpec],
}

impl Layout {
    fn sections(&self) -> Vec<Section> {
        self.sections
            .iter()
            .map(|(name, prefix)| Section::new(*name, *prefix))
            .collect()
    }
}

/// Build the summary sheet plus one sheet per table.
pub(crate) fn build(record: &ExtractedRecord, layout: &Layout) -> Vec<SheetDefinition> {
    build_with(record, layout, Vec::new())
}

/// Like [`build`], with builder-specific sheets appended after the summary.
pub(crate) fn build_with(
    record: &ExtractedRecord,
    layout: &Layout,
    extra: Vec<SheetDefinition>,
) -> Vec<SheetDefinition> {
    let (mut remaining, mut loose) = match &record.data {
        Value::Object(map) => (map.clone(), None),
        other => (Map::new(), Some(other.clone())),
    };
    let mut tables = extra;

    for (idx, table) in layout.tables.iter().enumerate() {
        let rows = if idx == 0 && loose.as_ref().is_some_and(is_object_array) {
            match loose.take() {
                Some(Value::Array(rows)) => rows,
                _ => Vec::new(),
            }
        } else {
            take_array(&mut remaining, table.fields)
        };
        let mut sheet = SheetDefinition::new(table.sheet);
        let options = TableOptions::titled(table.sheet).with_order(table.order.iter().copied());
        build_table(&mut sheet, &rows, &options);
        tables.push(sheet);
    }

    for (field, rows) in take_object_arrays(&mut remaining) {
        let name = format_title(&field);
        debug!(field = %field, rows = rows.len(), "undeclared array rendered as table");
        let mut sheet = SheetDefinition::new(name.clone());
        build_table(&mut sheet, &rows, &TableOptions::titled(name));
        tables.push(sheet);
    }

    let mut summary = summary_sheet(record, layout.summary_sheet);
    let has_fields = !remaining.is_empty();
    render_sections(&mut summary, &Value::Object(remaining), &layout.sections());
    if let Some(data) = &loose {
        debug!(sheet = %summary.name, "non-object payload kept as raw data");
        push_raw_data(&mut summary, data);
    } else if !has_fields && tables.is_empty() {
        summary.push_blank();
        summary.push_note(NO_DATA);
    }

    let mut sheets = Vec::with_capacity(tables.len() + 1);
    sheets.push(summary);
    sheets.extend(tables);
    sheets
}

/// A sheet opened with the document title and the metadata block.
pub(crate) fn summary_sheet(record: &ExtractedRecord, name: &str) -> SheetDefinition {
    let mut sheet = SheetDefinition::new(name);
    sheet.push_title(record.document_type.display_name());
    let metadata = flatten(&Value::Object(record.metadata.clone()), "");
    render_key_values(&mut sheet, DOCUMENT_INFORMATION, &metadata);
    sheet
}

/// One section per child object of `value`, in key order.
pub(crate) fn child_sections(value: &Value) -> Vec<Section> {
    value
        .as_object()
        .map(|map| {
            map.iter()
                .filter(|(_, v)| v.as_object().is_some_and(|o| !o.is_empty()))
                .map(|(k, _)| Section::new(format_title(k), k.as_str()))
                .collect()
        })
        .unwrap_or_default()
}

/// Remove and return the first array found under `fields`. Fields holding
/// something other than an array are left in place.
fn take_array(map: &mut Map<String, Value>, fields: &[&str]) -> Vec<Value> {
    for field in fields {
        if map.get(*field).is_some_and(Value::is_array)
            && let Some(Value::Array(rows)) = map.shift_remove(*field)
        {
            return rows;
        }
    }
    Vec::new()
}

fn is_object_array(value: &Value) -> bool {
    value
        .as_array()
        .and_then(|rows| rows.first())
        .is_some_and(Value::is_object)
}

/// Remove every array whose first element is an object.
fn take_object_arrays(map: &mut Map<String, Value>) -> Vec<(String, Vec<Value>)> {
    let keys: Vec<String> = map
        .iter()
        .filter(|(_, v)| is_object_array(v))
        .map(|(k, _)| k.clone())
        .collect();

    keys.into_iter()
        .filter_map(|key| match map.shift_remove(&key) {
            Some(Value::Array(rows)) => Some((key, rows)),
            _ => None,
        })
        .collect()
}
