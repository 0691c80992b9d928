use crate::document::ExtractedRecord;
use crate::sheet::SheetDefinition;

use super::layout::{self, Layout, TableSpec};

// `income` and `expenses` arrive either as objects (rendered as sections)
// or as arrays of line items (rendered as their own sheets).
const LAYOUT: Layout = Layout {
    summary_sheet: "Budget Summary",
    sections: &[
        ("Property Information", "propertyInfo"),
        ("Budget Period", "budgetPeriod"),
        ("Income", "income"),
        ("Expenses", "expenses"),
        ("Summary", "summary"),
    ],
    tables: &[TableSpec {
        sheet: "Line Items",
        fields: &["lineItems"],
        order: &[
            "category",
            "description",
            "annualAmount",
            "monthlyAmount",
            "perUnit",
            "perSquareFoot",
        ],
    }],
};

pub fn build(record: &ExtractedRecord) -> Vec<SheetDefinition> {
    layout::build(record, &LAYOUT)
}
