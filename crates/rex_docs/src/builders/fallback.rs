//! Universal builder for records without a dedicated layout.
//!
//! Emits the document type, the extraction time and the raw payload as
//! pretty-printed JSON, one line per row so no cell exceeds the container's
//! per-cell length limit.

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::document::ExtractedRecord;
use crate::sheet::SheetDefinition;

pub const SHEET_NAME: &str = "Extracted Data";
pub const RAW_DATA_HEADING: &str = "Raw Data";

/// Metadata keys consulted, in order, for the extraction timestamp.
const TIMESTAMP_KEYS: &[&str] = &["extractedAt", "extractionDate", "timestamp"];

pub fn build(record: &ExtractedRecord) -> Vec<SheetDefinition> {
    let mut sheet = SheetDefinition::new(SHEET_NAME);
    sheet.push_title(record.document_type.display_name());
    sheet.push_field(
        "Document Type",
        &Value::String(record.document_type.tag().to_string()),
    );
    sheet.push_field("Extracted At", &extraction_time(record));

    push_raw_data(&mut sheet, &record.data);

    vec![sheet]
}

/// Append a "Raw Data" block holding `data` as pretty JSON, one line per row.
pub(crate) fn push_raw_data(sheet: &mut SheetDefinition, data: &Value) {
    sheet.push_blank();
    sheet.push_section_header(RAW_DATA_HEADING);
    for line in raw_text(data).lines() {
        sheet.push_values([&Value::String(line.to_string())]);
    }
}

fn extraction_time(record: &ExtractedRecord) -> Value {
    TIMESTAMP_KEYS
        .iter()
        .find_map(|key| record.metadata.get(*key).filter(|v| !v.is_null()).cloned())
        .unwrap_or_else(|| Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)))
}

/// Pretty JSON for the payload. Serializing a `Value` cannot fail, but the
/// compact form is used if it ever does.
pub fn raw_text(data: &Value) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentType;
    use serde_json::{Map, json};

    fn record(metadata: Value, data: Value) -> ExtractedRecord {
        let metadata = metadata.as_object().cloned().unwrap_or_else(Map::new);
        ExtractedRecord::new(DocumentType::from_tag("appraisal"), metadata, data)
    }

    #[test]
    fn test_raw_payload_is_preserved_line_by_line() {
        let data = json!({"valuation": {"asIs": 1000000}, "notes": ["a"]});
        let sheets = build(&record(json!({}), data.clone()));
        assert_eq!(sheets.len(), 1);

        let rows = sheets[0].text_rows();
        let start = rows
            .iter()
            .position(|r| r == &vec![RAW_DATA_HEADING.to_string()])
            .unwrap();
        let text: Vec<String> = rows[start + 1..].iter().map(|r| r[0].clone()).collect();
        assert_eq!(text.join("\n"), serde_json::to_string_pretty(&data).unwrap());
    }

    #[test]
    fn test_document_type_and_timestamp_rows() {
        let sheets = build(&record(
            json!({"extractedAt": "2024-05-01T10:00:00Z"}),
            json!({}),
        ));
        let rows = sheets[0].text_rows();
        assert!(rows.contains(&vec!["Document Type".to_string(), "appraisal".to_string()]));
        assert!(rows.contains(&vec![
            "Extracted At".to_string(),
            "2024-05-01T10:00:00Z".to_string()
        ]));
    }

    #[test]
    fn test_missing_timestamp_falls_back_to_now() {
        let sheets = build(&record(json!({}), json!(null)));
        let rows = sheets[0].text_rows();
        let stamp = rows
            .iter()
            .find(|r| r.first().is_some_and(|c| c == "Extracted At"))
            .unwrap();
        assert!(stamp[1].ends_with('Z'));
    }
}
