use crate::document::ExtractedRecord;
use crate::sheet::SheetDefinition;

use super::layout::{self, Layout, TableSpec};

const LAYOUT: Layout = Layout {
    summary_sheet: "Lease Summary",
    sections: &[
        ("Parties", "parties"),
        ("Premises", "premises"),
        ("Term", "term"),
        ("Rent", "rent"),
        ("Provisions", "provisions"),
    ],
    tables: &[TableSpec {
        sheet: "Rent Schedule",
        fields: &["rentSchedule"],
        order: &[
            "period",
            "startDate",
            "endDate",
            "monthlyRent",
            "annualRent",
            "rentPerSquareFoot",
        ],
    }],
};

pub fn build(record: &ExtractedRecord) -> Vec<SheetDefinition> {
    layout::build(record, &LAYOUT)
}
