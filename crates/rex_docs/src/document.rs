use std::fmt;

use serde_json::{Map, Value};

/// Document kinds the extraction service can tag a record with.
///
/// Any tag outside the known set is carried verbatim in [`DocumentType::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocumentType {
    RentRoll,
    OperatingBudget,
    BrokerSalesComparables,
    BrokerLeaseComparables,
    BrokerListing,
    OfferingMemo,
    LeaseAgreement,
    FinancialStatements,
    /// Legacy tag superseded by `broker_sales_comparables`.
    ComparableSales,
    /// Legacy tag superseded by `financial_statements`.
    FinancialStatement,
    Unknown(String),
}

impl DocumentType {
    /// Every tag with a dedicated builder.
    pub const KNOWN: [DocumentType; 10] = [
        DocumentType::RentRoll,
        DocumentType::OperatingBudget,
        DocumentType::BrokerSalesComparables,
        DocumentType::BrokerLeaseComparables,
        DocumentType::BrokerListing,
        DocumentType::OfferingMemo,
        DocumentType::LeaseAgreement,
        DocumentType::FinancialStatements,
        DocumentType::ComparableSales,
        DocumentType::FinancialStatement,
    ];

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "rent_roll" => Self::RentRoll,
            "operating_budget" => Self::OperatingBudget,
            "broker_sales_comparables" => Self::BrokerSalesComparables,
            "broker_lease_comparables" => Self::BrokerLeaseComparables,
            "broker_listing" => Self::BrokerListing,
            "offering_memo" => Self::OfferingMemo,
            "lease_agreement" => Self::LeaseAgreement,
            "financial_statements" => Self::FinancialStatements,
            "comparable_sales" => Self::ComparableSales,
            "financial_statement" => Self::FinancialStatement,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            Self::RentRoll => "rent_roll",
            Self::OperatingBudget => "operating_budget",
            Self::BrokerSalesComparables => "broker_sales_comparables",
            Self::BrokerLeaseComparables => "broker_lease_comparables",
            Self::BrokerListing => "broker_listing",
            Self::OfferingMemo => "offering_memo",
            Self::LeaseAgreement => "lease_agreement",
            Self::FinancialStatements => "financial_statements",
            Self::ComparableSales => "comparable_sales",
            Self::FinancialStatement => "financial_statement",
            Self::Unknown(tag) => tag,
        }
    }

    /// Human-readable name used in sheet titles.
    pub fn display_name(&self) -> &str {
        match self {
            Self::RentRoll => "Rent Roll",
            Self::OperatingBudget => "Operating Budget",
            Self::BrokerSalesComparables => "Broker Sales Comparables",
            Self::BrokerLeaseComparables => "Broker Lease Comparables",
            Self::BrokerListing => "Broker Listing",
            Self::OfferingMemo => "Offering Memorandum",
            Self::LeaseAgreement => "Lease Agreement",
            Self::FinancialStatements => "Financial Statements",
            Self::ComparableSales => "Comparable Sales",
            Self::FinancialStatement => "Financial Statement",
            Self::Unknown(_) => "Extracted Document",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A tagged record produced by the extraction service.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRecord {
    pub document_type: DocumentType,
    pub metadata: Map<String, Value>,
    pub data: Value,
}

impl ExtractedRecord {
    pub fn new(document_type: DocumentType, metadata: Map<String, Value>, data: Value) -> Self {
        Self {
            document_type,
            metadata,
            data,
        }
    }

    /// `data` as an object, or an empty map when the payload is some other shape.
    pub fn data_object(&self) -> Map<String, Value> {
        match &self.data {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        }
    }
}
