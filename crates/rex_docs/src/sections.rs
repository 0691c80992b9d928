//! Labeled key/value blocks grouped by dotted-path prefix.

use serde_json::Value;

use crate::flatten::{FlatRecord, flatten};
use crate::sheet::SheetDefinition;
use crate::title::format_title;

/// Heading of the block that collects keys no section claimed.
pub const OTHER_SECTION: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub prefix: String,
}

impl Section {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
        }
    }
}

/// Render `record` as one block per section, in declaration order, followed
/// by an [`OTHER_SECTION`] block for unclaimed keys.
///
/// A key belongs to a section when it starts with `prefix + "."`. Sections
/// with no matching keys are skipped, as is an empty residual block.
pub fn render_sections(sheet: &mut SheetDefinition, record: &Value, sections: &[Section]) {
    let flat = flatten(record, "");
    let dotted: Vec<String> = sections.iter().map(|s| format!("{}.", s.prefix)).collect();

    for (section, dotted_prefix) in sections.iter().zip(&dotted) {
        let block: FlatRecord = flat
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(dotted_prefix.as_str())
                    .map(|rest| (rest.to_string(), value.clone()))
            })
            .collect();
        render_key_values(sheet, &section.name, &block);
    }

    let residual: FlatRecord = flat
        .into_iter()
        .filter(|(key, _)| !dotted.iter().any(|p| key.starts_with(p.as_str())))
        .collect();
    render_key_values(sheet, OTHER_SECTION, &residual);
}

/// Emit one heading followed by a label/value row per entry. Does nothing
/// for an empty map.
pub fn render_key_values(sheet: &mut SheetDefinition, heading: &str, fields: &FlatRecord) {
    if fields.is_empty() {
        return;
    }
    sheet.push_blank();
    sheet.push_section_header(heading);
    for (key, value) in fields {
        sheet.push_field(format_title(key), value);
    }
}
