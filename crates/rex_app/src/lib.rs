//! Export service for structured document extractions.
//!
//! [`export::Exporter`] turns a request body into a spreadsheet;
//! [`server`] exposes it over HTTP.

pub mod export;
pub mod server;
pub mod transport;

pub use export::{ExportOptions, ExportOutcome, ExportSettings, Exporter};
pub use server::ServerState;
