use crate::document::ExtractedRecord;
use crate::sheet::SheetDefinition;

use super::layout::{self, Layout, TableSpec};

const LAYOUT: Layout = Layout {
    summary_sheet: "Listing",
    sections: &[
        ("Property Details", "propertyDetails"),
        ("Pricing", "pricing"),
        ("Listing", "listingInfo"),
        ("Broker", "brokerInfo"),
    ],
    tables: &[
        TableSpec {
            sheet: "Units",
            fields: &["units", "unitMix"],
            order: &["unitType", "count", "squareFeet", "rent"],
        },
        TableSpec {
            sheet: "Tenants",
            fields: &["tenants"],
            order: &["tenantName", "suiteUnit", "squareFeet", "leaseEnd", "rent"],
        },
    ],
};

pub fn build(record: &ExtractedRecord) -> Vec<SheetDefinition> {
    layout::build(record, &LAYOUT)
}
