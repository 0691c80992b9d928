//! Tables over arrays of records whose shape is not known up front.
//!
//! Columns come from flattening the *first* record only. Paths that appear
//! only in later records are not rendered; paths missing from a later record
//! render as [`NOT_AVAILABLE`].

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;

use crate::flatten::{FlatRecord, NOT_AVAILABLE, flatten};
use crate::sheet::SheetDefinition;
use crate::title::format_title;

/// Informational row written when there are no records.
pub const NO_DATA: &str = "No data available";

/// Column used when records are plain values rather than objects.
const SCALAR_COLUMN: &str = "value";

#[derive(Debug, Clone, Default)]
pub struct TableOptions {
    pub title: Option<String>,
    pub exclude_fields: HashSet<String>,
    pub field_order: Vec<String>,
}

impl TableOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_order<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_order = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn excluding<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

/// Append a header row plus one row per record to `sheet`.
pub fn build_table(sheet: &mut SheetDefinition, records: &[Value], options: &TableOptions) {
    let Some(first) = records.first() else {
        sheet.push_note(NO_DATA);
        return;
    };

    let prefix = if first.is_object() { "" } else { SCALAR_COLUMN };
    let columns = resolve_columns(&flatten(first, prefix), options);
    debug!(
        sheet = %sheet.name,
        records = records.len(),
        columns = columns.len(),
        "building table"
    );

    if let Some(title) = &options.title {
        sheet.push_title(title.clone());
    }
    sheet.push_header(columns.iter().map(|c| format_title(c)));
    sheet.freeze_through_last_row();

    let missing = Value::String(NOT_AVAILABLE.to_string());
    for record in records {
        let flat = flatten(record, prefix);
        sheet.push_values(columns.iter().map(|c| flat.get(c).unwrap_or(&missing)));
    }
}

/// Discovered columns minus exclusions, with `field_order` entries first.
pub fn resolve_columns(discovered: &FlatRecord, options: &TableOptions) -> Vec<String> {
    let available: Vec<&String> = discovered
        .keys()
        .filter(|k| !options.exclude_fields.contains(k.as_str()))
        .collect();

    let mut columns: Vec<String> = Vec::with_capacity(available.len());
    for wanted in &options.field_order {
        if available.iter().any(|k| *k == wanted) && !columns.contains(wanted) {
            columns.push(wanted.clone());
        }
    }
    for key in available {
        if !columns.contains(key) {
            columns.push(key.clone());
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn header_of(sheet: &SheetDefinition) -> Vec<String> {
        sheet.text_rows()[0].clone()
    }

    #[test]
    fn test_empty_records_write_single_marker_row() {
        let mut sheet = SheetDefinition::new("T");
        let options = TableOptions::titled("Tenants").with_order(["x"]);
        build_table(&mut sheet, &[], &options);
        assert_eq!(sheet.text_rows(), vec![vec![NO_DATA.to_string()]]);
    }

    #[test]
    fn test_columns_come_from_first_record() {
        let mut sheet = SheetDefinition::new("T");
        let records = vec![json!({"x": 1, "y": 2}), json!({"x": 3, "y": 4, "z": 5})];
        build_table(&mut sheet, &records, &TableOptions::default());
        assert_eq!(header_of(&sheet), vec!["X", "Y"]);
        assert_eq!(sheet.text_rows()[2], vec!["3", "4"]);
    }

    #[test]
    fn test_field_order_puts_requested_columns_first() {
        let mut sheet = SheetDefinition::new("T");
        let records = vec![json!({"x": 1, "y": 2}), json!({"x": 3, "y": 4, "z": 5})];
        let options = TableOptions::default().with_order(["y", "x"]);
        build_table(&mut sheet, &records, &options);
        assert_eq!(header_of(&sheet), vec!["Y", "X"]);
    }

    #[test]
    fn test_field_order_ignores_unknown_and_appends_rest() {
        let discovered = flatten(&json!({"a": 1, "b": 2, "c": 3}), "");
        let options = TableOptions::default().with_order(["c", "nope", "c"]);
        assert_eq!(resolve_columns(&discovered, &options), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_exclusions_apply_before_ordering() {
        let discovered = flatten(&json!({"a": 1, "b": 2, "c": 3}), "");
        let options = TableOptions::default()
            .excluding(["b"])
            .with_order(["b", "c"]);
        assert_eq!(resolve_columns(&discovered, &options), vec!["c", "a"]);
    }

    #[test]
    fn test_missing_columns_render_not_available() {
        let mut sheet = SheetDefinition::new("T");
        let records = vec![json!({"x": 1, "y": 2}), json!({"x": 3})];
        build_table(&mut sheet, &records, &TableOptions::default());
        assert_eq!(sheet.text_rows()[2], vec!["3", "N/A"]);
    }

    #[test]
    fn test_title_row_precedes_header_and_freeze_covers_both() {
        let mut sheet = SheetDefinition::new("T");
        let records = vec![json!({"baseRent": 1000})];
        build_table(&mut sheet, &records, &TableOptions::titled("Rent"));
        let rows = sheet.text_rows();
        assert_eq!(rows[0], vec!["Rent"]);
        assert_eq!(rows[1], vec!["Base Rent"]);
        assert_eq!(sheet.frozen_rows, Some(2));
    }

    #[test]
    fn test_nested_record_columns_are_dotted() {
        let mut sheet = SheetDefinition::new("T");
        let records = vec![json!({"tenant": {"name": "Foo"}, "tags": ["a", "b"]})];
        build_table(&mut sheet, &records, &TableOptions::default());
        assert_eq!(header_of(&sheet), vec!["Tenant.name", "Tags"]);
        assert_eq!(sheet.text_rows()[1], vec!["Foo", "a, b"]);
    }

    #[test]
    fn test_scalar_records_use_value_column() {
        let mut sheet = SheetDefinition::new("T");
        let records = vec![json!("Near transit"), json!(null)];
        build_table(&mut sheet, &records, &TableOptions::default());
        let rows = sheet.text_rows();
        assert_eq!(rows[0], vec!["Value"]);
        assert_eq!(rows[1], vec!["Near transit"]);
        assert_eq!(rows[2], vec!["N/A"]);
    }
}
