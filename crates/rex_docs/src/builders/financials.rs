//! Financial statements.
//!
//! The current schema nests one object per statement; each becomes its own
//! sheet with a section per child object. A statement given as rows gets a
//! table instead, and any other value is written as a single field. The
//! legacy single-statement schema is flat and only carries optional line
//! items.

use serde_json::Value;

use crate::document::ExtractedRecord;
use crate::sections::render_sections;
use crate::sheet::SheetDefinition;
use crate::table::{NO_DATA, TableOptions, build_table};

use super::layout::{self, Layout, TableSpec, child_sections};

const STATEMENTS: &[(&str, &str)] = &[
    ("incomeStatement", "Income Statement"),
    ("balanceSheet", "Balance Sheet"),
    ("cashFlow", "Cash Flow"),
];

const CURRENT: Layout = Layout {
    summary_sheet: "Statement Summary",
    sections: &[("Statement Information", "statementInfo")],
    tables: &[],
};

const LEGACY: Layout = Layout {
    summary_sheet: "Financial Statement",
    sections: &[("Statement Information", "statementInfo")],
    tables: &[TableSpec {
        sheet: "Line Items",
        fields: &["lineItems"],
        order: &["category", "description", "amount", "period"],
    }],
};

pub fn build(record: &ExtractedRecord) -> Vec<SheetDefinition> {
    if !record.data.is_object() {
        return layout::build(record, &CURRENT);
    }

    let mut statements = Vec::new();
    let mut rest = record.data_object();

    for (field, name) in STATEMENTS {
        let Some(statement) = rest.shift_remove(*field) else {
            continue;
        };
        statements.push(statement_sheet(name, &statement));
    }

    let summary = ExtractedRecord::new(
        record.document_type.clone(),
        record.metadata.clone(),
        Value::Object(rest),
    );
    layout::build_with(&summary, &CURRENT, statements)
}

pub fn build_legacy(record: &ExtractedRecord) -> Vec<SheetDefinition> {
    layout::build(record, &LEGACY)
}

fn statement_sheet(name: &str, statement: &Value) -> SheetDefinition {
    let mut sheet = SheetDefinition::new(name);
    match statement {
        Value::Array(rows) if rows.first().is_some_and(Value::is_object) => {
            build_table(&mut sheet, rows, &TableOptions::titled(name));
        }
        Value::Object(_) => {
            sheet.push_title(name);
            render_sections(&mut sheet, statement, &child_sections(statement));
            if sheet.rows.len() == 1 {
                sheet.push_note(NO_DATA);
            }
        }
        Value::Null => {
            sheet.push_title(name);
            sheet.push_note(NO_DATA);
        }
        other => {
            sheet.push_title(name);
            sheet.push_field(name, other);
        }
    }
    sheet
}
