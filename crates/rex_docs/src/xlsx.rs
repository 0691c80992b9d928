use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

use crate::sheet::{CellValue, SheetDefinition};
use crate::style::{CellRole, CellStyle, HorizontalAlign, style_for};

/// Excel rejects longer sheet names.
const MAX_SHEET_NAME: usize = 31;
const FORBIDDEN_NAME_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Render sheet definitions into an xlsx workbook.
///
/// Returns the raw bytes of the xlsx file (can be written to disk or sent as download).
pub fn generate_xlsx(sheets: &[SheetDefinition]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let formats = role_formats();
    let names = unique_sheet_names(sheets);

    for (sheet, name) in sheets.iter().zip(&names) {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(name)
            .with_context(|| format!("Failed to set sheet name: {name}"))?;
        write_sheet(worksheet, sheet, &formats)
            .with_context(|| format!("Failed to write sheet: {name}"))?;
    }

    let bytes = workbook
        .save_to_buffer()
        .context("Failed to save workbook to buffer")?;

    Ok(bytes)
}

fn write_sheet(
    worksheet: &mut Worksheet,
    sheet: &SheetDefinition,
    formats: &HashMap<CellRole, Format>,
) -> Result<()> {
    for (row_idx, row) in sheet.rows.iter().enumerate() {
        let excel_row = u32::try_from(row_idx).context("Row index out of range")?;
        for (col_idx, cell) in row.iter().enumerate() {
            let col = u16::try_from(col_idx).context("Column index out of range")?;
            let format = &formats[&cell.role];
            match &cell.value {
                CellValue::Empty => {
                    worksheet.write_blank(excel_row, col, format)?;
                }
                CellValue::Text(text) => {
                    worksheet
                        .write_string_with_format(excel_row, col, text, format)
                        .with_context(|| {
                            format!("Failed to write string at ({excel_row}, {col})")
                        })?;
                }
                CellValue::Number(num) => {
                    worksheet
                        .write_number_with_format(excel_row, col, *num, format)
                        .with_context(|| {
                            format!("Failed to write number at ({excel_row}, {col})")
                        })?;
                }
                CellValue::Bool(b) => {
                    worksheet.write_boolean_with_format(excel_row, col, *b, format)?;
                }
            }
        }
    }

    if let Some(frozen) = sheet.frozen_rows.filter(|n| *n > 0) {
        worksheet
            .set_freeze_panes(frozen, 0)
            .context("Failed to freeze header rows")?;
    }

    // Auto-fit columns for readability
    worksheet.autofit();
    Ok(())
}

fn role_formats() -> HashMap<CellRole, Format> {
    [
        CellRole::Title,
        CellRole::Header,
        CellRole::SectionHeader,
        CellRole::Label,
        CellRole::Value,
        CellRole::Note,
    ]
    .into_iter()
    .map(|role| (role, to_format(&style_for(role))))
    .collect()
}

fn to_format(style: &CellStyle) -> Format {
    let mut format = Format::new().set_font_size(style.font_size);

    if style.bold {
        format = format.set_bold();
    }
    if style.italic {
        format = format.set_italic();
    }
    if let Some(rgb) = style.font_color {
        format = format.set_font_color(Color::RGB(rgb));
    }
    if let Some(rgb) = style.fill {
        format = format.set_background_color(Color::RGB(rgb));
    }
    if style.border {
        format = format.set_border(FormatBorder::Thin);
    }

    format.set_align(match style.align {
        HorizontalAlign::General => FormatAlign::General,
        HorizontalAlign::Left => FormatAlign::Left,
        HorizontalAlign::Center => FormatAlign::Center,
    })
}

/// Sheet names Excel will accept: forbidden characters replaced, at most
/// 31 characters, unique ignoring case.
pub fn unique_sheet_names(sheets: &[SheetDefinition]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(sheets.len());

    for (idx, sheet) in sheets.iter().enumerate() {
        let cleaned: String = sheet
            .name
            .chars()
            .map(|c| if FORBIDDEN_NAME_CHARS.contains(&c) { '_' } else { c })
            .collect();
        let cleaned = cleaned.trim().trim_matches('\'').to_string();
        let base = if cleaned.is_empty() {
            format!("Sheet{}", idx + 1)
        } else {
            truncate(&cleaned, MAX_SHEET_NAME)
        };

        let mut candidate = base.clone();
        let mut n = 2;
        while !seen.insert(candidate.to_lowercase()) {
            let suffix = format!(" ({n})");
            candidate = format!(
                "{}{suffix}",
                truncate(&base, MAX_SHEET_NAME - suffix.chars().count())
            );
            n += 1;
        }
        names.push(candidate);
    }

    names
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect::<String>().trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sheet(name: &str) -> SheetDefinition {
        let mut sheet = SheetDefinition::new(name);
        sheet.push_title("Title");
        sheet.push_header(["Name", "Rent"]);
        sheet.freeze_through_last_row();
        sheet.push_values([&json!("Foo"), &json!(1000)]);
        sheet
    }

    #[test]
    fn test_generate_xlsx_basic() {
        let bytes = generate_xlsx(&[sheet("Tenants")]).unwrap();
        // XLSX files start with PK (zip format)
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn test_generate_xlsx_multi_sheet_with_duplicate_names() {
        let bytes = generate_xlsx(&[sheet("Summary"), sheet("Summary"), sheet("")]).unwrap();
        assert_eq!(&bytes[0..2], b"PK");
    }

    #[test]
    fn test_generate_xlsx_empty_and_blank_cells() {
        let mut s = SheetDefinition::new("S");
        s.push_values([&json!(null), &json!(true)]);
        s.push_blank();
        s.push_note("No data available");
        let bytes = generate_xlsx(&[s]).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_generate_xlsx_rejects_oversized_cell() {
        let mut s = SheetDefinition::new("S");
        s.push_note("x".repeat(40_000));
        assert!(generate_xlsx(&[s]).is_err());
    }

    #[test]
    fn test_sheet_names_are_cleaned_and_unique() {
        let sheets = vec![
            SheetDefinition::new("Income/Expense [2024]"),
            SheetDefinition::new("summary"),
            SheetDefinition::new("Summary"),
            SheetDefinition::new("A very long sheet name that goes past the limit"),
            SheetDefinition::new("  "),
        ];
        let names = unique_sheet_names(&sheets);
        assert_eq!(names[0], "Income_Expense _2024_");
        assert_eq!(names[1], "summary");
        assert_eq!(names[2], "Summary (2)");
        assert!(names[3].chars().count() <= MAX_SHEET_NAME);
        assert_eq!(names[4], "Sheet5");
    }

    #[test]
    fn test_generate_xlsx_large_dataset() {
        let mut s = SheetDefinition::new("Comps");
        s.push_header(["ID", "Value"]);
        for i in 0..1000 {
            s.push_values([&json!(i), &json!(i as f64 * 1.5)]);
        }
        let bytes = generate_xlsx(&[s]).unwrap();
        assert!(bytes.len() > 1000);
    }
}
