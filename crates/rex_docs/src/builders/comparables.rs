//! Broker sales and lease comparables, plus the legacy `comparable_sales` tag.

use crate::document::ExtractedRecord;
use crate::sheet::SheetDefinition;

use super::layout::{self, Layout, TableSpec};

const CONTEXT_SECTIONS: &[(&str, &str)] = &[
    ("Subject Property", "subjectProperty"),
    ("Market Summary", "summary"),
    ("Broker", "brokerInfo"),
];

const SALES: Layout = Layout {
    summary_sheet: "Sales Comps Summary",
    sections: CONTEXT_SECTIONS,
    tables: &[TableSpec {
        sheet: "Sales Comparables",
        fields: &["comparables", "sales"],
        order: &[
            "propertyName",
            "address",
            "saleDate",
            "salePrice",
            "squareFeet",
            "pricePerSquareFoot",
            "units",
            "pricePerUnit",
            "capRate",
            "yearBuilt",
            "buyer",
            "seller",
        ],
    }],
};

const LEASES: Layout = Layout {
    summary_sheet: "Lease Comps Summary",
    sections: CONTEXT_SECTIONS,
    tables: &[TableSpec {
        sheet: "Lease Comparables",
        fields: &["comparables", "leases"],
        order: &[
            "propertyName",
            "address",
            "tenantName",
            "leaseDate",
            "squareFeet",
            "rentPerSquareFoot",
            "leaseTerm",
            "leaseType",
            "freeRent",
            "tenantImprovements",
        ],
    }],
};

pub fn build_sales(record: &ExtractedRecord) -> Vec<SheetDefinition> {
    layout::build(record, &SALES)
}

pub fn build_leases(record: &ExtractedRecord) -> Vec<SheetDefinition> {
    layout::build(record, &LEASES)
}
