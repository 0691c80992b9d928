use crate::document::ExtractedRecord;
use crate::sheet::SheetDefinition;

use super::layout::{self, Layout, TableSpec};

const LAYOUT: Layout = Layout {
    summary_sheet: "Rent Roll Summary",
    sections: &[
        ("Property Information", "propertyInfo"),
        ("Summary", "summary"),
    ],
    tables: &[TableSpec {
        sheet: "Tenants",
        fields: &["tenants", "units"],
        order: &[
            "suiteUnit",
            "tenantName",
            "squareFeet",
            "leaseStart",
            "leaseEnd",
            "monthlyRent",
            "baseRent",
            "annualRent",
            "rentPerSquareFoot",
            "securityDeposit",
            "status",
        ],
    }],
};

pub fn build(record: &ExtractedRecord) -> Vec<SheetDefinition> {
    layout::build(record, &LAYOUT)
}
