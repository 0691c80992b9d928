use crate::document::ExtractedRecord;
use crate::sheet::SheetDefinition;

use super::layout::{self, Layout, TableSpec};

const LAYOUT: Layout = Layout {
    summary_sheet: "Offering Summary",
    sections: &[
        ("Property Overview", "propertyOverview"),
        ("Investment Summary", "investmentSummary"),
        ("Financial Summary", "financialSummary"),
        ("Market Overview", "marketOverview"),
    ],
    tables: &[
        TableSpec {
            sheet: "Rent Roll",
            fields: &["rentRoll", "tenants"],
            order: &[
                "suiteUnit",
                "tenantName",
                "squareFeet",
                "leaseStart",
                "leaseEnd",
                "annualRent",
            ],
        },
        TableSpec {
            sheet: "Comparables",
            fields: &["comparables"],
            order: &["propertyName", "address", "saleDate", "salePrice", "capRate"],
        },
    ],
};

pub fn build(record: &ExtractedRecord) -> Vec<SheetDefinition> {
    layout::build(record, &LAYOUT)
}
