use anyhow::{Context, Result};

use crate::sheet::SheetDefinition;

/// Write every sheet into one CSV document.
///
/// Each sheet starts with a row holding its name; sheets are separated by an
/// empty row. Each field is properly quoted/escaped by the `csv` crate.
pub fn generate_csv(sheets: &[SheetDefinition]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    for (idx, sheet) in sheets.iter().enumerate() {
        if idx > 0 {
            writer
                .write_record([""])
                .context("Failed to write sheet separator")?;
        }
        writer
            .write_record([sheet.name.as_str()])
            .with_context(|| format!("Failed to write sheet name: {}", sheet.name))?;

        for row in sheet.text_rows() {
            if row.is_empty() {
                writer
                    .write_record([""])
                    .context("Failed to write blank record")?;
            } else {
                writer
                    .write_record(&row)
                    .context("Failed to write data record")?;
            }
        }
    }

    let bytes = writer.into_inner().context("Failed to flush CSV writer")?;

    String::from_utf8(bytes).context("CSV output contained invalid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tenants() -> SheetDefinition {
        let mut sheet = SheetDefinition::new("Tenants");
        sheet.push_header(["Tenant Name", "Base Rent"]);
        sheet.push_values([&json!("Smith, John"), &json!(1000)]);
        sheet
    }

    #[test]
    fn test_generate_csv_basic() {
        let result = generate_csv(&[tenants()]).unwrap();
        let mut lines = result.lines();
        assert_eq!(lines.next(), Some("Tenants"));
        assert_eq!(lines.next(), Some("Tenant Name,Base Rent"));
        // Fields containing commas should be quoted
        assert_eq!(lines.next(), Some("\"Smith, John\",1000"));
    }

    #[test]
    fn test_generate_csv_uneven_rows() {
        let mut sheet = tenants();
        sheet.push_note("No data available");
        let result = generate_csv(&[sheet]).unwrap();
        assert!(result.lines().any(|l| l == "No data available"));
    }

    #[test]
    fn test_generate_csv_multiple_sheets_in_order() {
        let mut summary = SheetDefinition::new("Summary");
        summary.push_field("Property Name", &json!("Acme Plaza"));
        let result = generate_csv(&[summary, tenants()]).unwrap();
        let summary_at = result.find("Summary").unwrap();
        let tenants_at = result.find("Tenants").unwrap();
        assert!(summary_at < tenants_at);
        assert!(result.contains("Property Name,Acme Plaza"));
    }
}
