//! Structured-to-tabular export engine.
//!
//! Records tagged with a [`DocumentType`] are turned into an ordered list of
//! [`SheetDefinition`]s by [`build_workbook`], then serialized by an
//! [`ExportFormat`] backend. Everything up to serialization is pure.

pub mod builders;
pub mod csv;
pub mod document;
pub mod flatten;
pub mod output;
pub mod sections;
pub mod sheet;
pub mod style;
pub mod table;
pub mod title;
pub mod xlsx;

pub use builders::build_workbook;
pub use document::{DocumentType, ExtractedRecord};
pub use flatten::{FlatRecord, NOT_AVAILABLE, flatten};
pub use output::ExportFormat;
pub use sections::{Section, render_sections};
pub use sheet::{Cell, CellValue, SheetDefinition};
pub use style::{CellRole, CellStyle, style_for};
pub use table::{NO_DATA, TableOptions, build_table};
pub use title::format_title;
