//! Document-type dispatch.
//!
//! Each known [`DocumentType`] maps to exactly one builder; anything else
//! goes to the fallback, so every record produces at least one sheet.

pub mod comparables;
pub mod fallback;
pub mod financials;
mod layout;
pub mod lease;
pub mod listing;
pub mod offering_memo;
pub mod operating_budget;
pub mod rent_roll;

use tracing::debug;

use crate::document::{DocumentType, ExtractedRecord};
use crate::sheet::SheetDefinition;

/// Build every sheet for `record`.
pub fn build_workbook(record: &ExtractedRecord) -> Vec<SheetDefinition> {
    let sheets = match &record.document_type {
        DocumentType::RentRoll => rent_roll::build(record),
        DocumentType::OperatingBudget => operating_budget::build(record),
        DocumentType::BrokerSalesComparables => comparables::build_sales(record),
        DocumentType::BrokerLeaseComparables => comparables::build_leases(record),
        DocumentType::BrokerListing => listing::build(record),
        DocumentType::OfferingMemo => offering_memo::build(record),
        DocumentType::LeaseAgreement => lease::build(record),
        DocumentType::FinancialStatements => financials::build(record),
        DocumentType::ComparableSales => comparables::build_sales(record),
        DocumentType::FinancialStatement => financials::build_legacy(record),
        DocumentType::Unknown(_) => fallback::build(record),
    };
    debug!(
        document_type = %record.document_type,
        sheets = sheets.len(),
        "workbook built"
    );
    sheets
}
