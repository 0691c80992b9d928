//! Export orchestration: guard → validate → dispatch → serialize.
//!
//! Nothing here touches the network; the HTTP layer and the `convert`
//! command both call [`Exporter::export_bytes`].

use std::panic::{AssertUnwindSafe, catch_unwind};

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use rex_core::{RexConfig, RexError};
use rex_docs::{DocumentType, ExportFormat, ExtractedRecord, SheetDefinition, build_workbook};
use rex_shield::{GuardConfig, PayloadGuard};

/// Settings that shape every export.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub filename_prefix: String,
    pub freeze_header_rows: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        let config = RexConfig::default();
        Self {
            filename_prefix: config.filename_prefix,
            freeze_header_rows: config.freeze_header_rows,
        }
    }
}

/// Per-request options from the optional `options` object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub filename_prefix: Option<String>,
}

/// A finished export.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: &'static str,
    /// Hex SHA-256 of `bytes`.
    pub digest: String,
    pub sheet_count: usize,
}

pub struct Exporter {
    settings: ExportSettings,
    guard: PayloadGuard,
}

impl Exporter {
    pub fn new(settings: ExportSettings, guard: PayloadGuard) -> Self {
        Self { settings, guard }
    }

    pub fn from_config(config: &RexConfig) -> Self {
        Self::new(
            ExportSettings {
                filename_prefix: config.filename_prefix.clone(),
                freeze_header_rows: config.freeze_header_rows,
            },
            PayloadGuard::new(GuardConfig {
                max_depth: config.max_depth,
                ..Default::default()
            }),
        )
    }

    /// Export a raw JSON request body.
    pub fn export_bytes(&self, body: &[u8]) -> Result<ExportOutcome, RexError> {
        let request: Value =
            serde_json::from_slice(body).map_err(|e| RexError::MalformedJson(e.to_string()))?;
        self.export(&request)
    }

    pub fn export(&self, request: &Value) -> Result<ExportOutcome, RexError> {
        self.export_at(request, Utc::now())
    }

    /// Export with an explicit timestamp for the filename.
    pub fn export_at(&self, request: &Value, now: DateTime<Utc>) -> Result<ExportOutcome, RexError> {
        self.guard
            .inspect(request)
            .map_err(|v| RexError::Rejected(v.to_string()))?;

        let (record, options) = parse_request(request)?;
        debug!(
            document_type = %record.document_type,
            format = ?options.format,
            "export request accepted"
        );
        if let DocumentType::Unknown(tag) = &record.document_type {
            warn!(document_type = %tag, "unrecognized document type, using fallback layout");
        }

        let freeze = self.settings.freeze_header_rows;
        let rendered = catch_unwind(AssertUnwindSafe(|| {
            let mut sheets = build_workbook(&record);
            if !freeze {
                sheets.iter_mut().for_each(|s| s.frozen_rows = None);
            }
            let sheet_count = sheets.len();
            options
                .format
                .render(&sheets)
                .map(|bytes| (bytes, sheet_count))
        }));

        let (bytes, sheet_count) = match rendered {
            Ok(Ok(done)) => done,
            Ok(Err(e)) => {
                error!("Export rendering failed: {e:#}");
                return Err(RexError::Render(format!("{e:#}")));
            }
            Err(_) => {
                error!(document_type = %record.document_type, "Export rendering panicked");
                return Err(RexError::Render("unexpected failure while rendering".into()));
            }
        };

        let prefix = options
            .filename_prefix
            .as_deref()
            .unwrap_or(&self.settings.filename_prefix);
        let filename = export_filename(prefix, &record.document_type, options.format, now);
        let digest = hex::encode(Sha256::digest(&bytes));

        info!(
            document_type = %record.document_type,
            sheets = sheet_count,
            bytes = bytes.len(),
            filename = %filename,
            "export complete"
        );

        Ok(ExportOutcome {
            bytes,
            filename,
            content_type: options.format.content_type(),
            digest,
            sheet_count,
        })
    }

    /// Build the sheet definitions without serializing them.
    pub fn preview(&self, request: &Value) -> Result<Vec<SheetDefinition>, RexError> {
        self.guard
            .inspect(request)
            .map_err(|v| RexError::Rejected(v.to_string()))?;
        let (record, _) = parse_request(request)?;
        Ok(build_workbook(&record))
    }
}

/// Pull the tagged record and options out of a request body.
pub fn parse_request(request: &Value) -> Result<(ExtractedRecord, ExportOptions), RexError> {
    let extracted = request
        .get("extractedData")
        .and_then(Value::as_object)
        .ok_or_else(|| RexError::InvalidRequest("extractedData is required".into()))?;

    let document_type = match extracted.get("documentType") {
        Some(Value::String(tag)) if !tag.trim().is_empty() => DocumentType::from_tag(tag.trim()),
        Some(Value::String(_)) | Some(Value::Null) | None => {
            return Err(RexError::InvalidRequest(
                "extractedData.documentType is required".into(),
            ));
        }
        Some(_) => {
            return Err(RexError::InvalidRequest(
                "extractedData.documentType must be a string".into(),
            ));
        }
    };

    let data = match extracted.get("data") {
        Some(Value::Null) | None => {
            return Err(RexError::InvalidRequest(
                "extractedData.data is required".into(),
            ));
        }
        Some(data) => data.clone(),
    };

    let metadata = extracted
        .get("metadata")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_else(Map::new);

    let options = parse_options(request.get("options"))?;
    Ok((ExtractedRecord::new(document_type, metadata, data), options))
}

fn parse_options(options: Option<&Value>) -> Result<ExportOptions, RexError> {
    let Some(options) = options.and_then(Value::as_object) else {
        return Ok(ExportOptions::default());
    };

    let format = match options.get("format").and_then(Value::as_str) {
        Some(name) => ExportFormat::from_name(name)
            .ok_or_else(|| RexError::InvalidRequest(format!("Unsupported format: {name}")))?,
        None => ExportFormat::default(),
    };

    let filename_prefix = options
        .get("filenamePrefix")
        .and_then(Value::as_str)
        .map(sanitize_component)
        .filter(|p| !p.is_empty());

    Ok(ExportOptions {
        format,
        filename_prefix,
    })
}

/// `<prefix>_<documentType>_<timestamp>.<ext>`, timestamp being ISO-8601
/// with the colons removed.
pub fn export_filename(
    prefix: &str,
    document_type: &DocumentType,
    format: ExportFormat,
    now: DateTime<Utc>,
) -> String {
    let timestamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace(':', "");
    format!(
        "{}_{}_{timestamp}.{}",
        sanitize_component(prefix),
        sanitize_component(document_type.tag()),
        format.extension()
    )
}

/// Keep filename components to `[A-Za-z0-9_-]`; anything else becomes `_`.
fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .take(64)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
