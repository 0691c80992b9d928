//! Minimal HTTP/1.1 plumbing for the export service.
//!
//! Requests are parsed straight off the socket; one request per connection,
//! always answered with `Connection: close`. No HTTP-server crate needed.

use http::{Method, StatusCode};
use serde_json::{Value, json};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tracing::{debug, warn};

use rex_core::RexError;

use crate::export::{ExportOutcome, Exporter};

// ── Constants ────────────────────────────────────────────────────────

pub const EXPORT_PATH: &str = "/api/export";
pub const HEALTH_PATH: &str = "/health";

const MAX_HEAD_BYTES: usize = 16 * 1024;
const MAX_HEADERS: usize = 100;
const CORS_MAX_AGE: &str = "86400";
const ALLOWED_METHODS: &str = "POST, OPTIONS";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

// ── Request ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Path without the query string.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Parse `METHOD /path?query HTTP/1.1`.
pub fn parse_request_line(line: &str) -> Result<(Method, String), RexError> {
    let mut parts = line.split_whitespace();
    let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(RexError::InvalidRequest("Malformed request line".into()));
    };
    if !version.starts_with("HTTP/1.") {
        return Err(RexError::InvalidRequest(format!(
            "Unsupported protocol: {version}"
        )));
    }
    let method = Method::from_bytes(method.as_bytes())
        .map_err(|_| RexError::InvalidRequest(format!("Invalid method: {method}")))?;
    let path = target.split_once('?').map_or(target, |(p, _)| p);
    Ok((method, path.to_string()))
}

fn parse_header_line(line: &str) -> Result<(String, String), RexError> {
    let (name, value) = line
        .split_once(':')
        .ok_or_else(|| RexError::InvalidRequest("Malformed header line".into()))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}

/// Read one CRLF- or LF-terminated head line, spending from `budget`.
///
/// The underlying read is capped at the remaining budget, so an unterminated
/// line never buffers more than [`MAX_HEAD_BYTES`] in total.
async fn read_head_line<B>(reader: &mut B, budget: &mut usize) -> Result<String, RexError>
where
    B: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let n = (&mut *reader)
        .take(*budget as u64)
        .read_until(b'\n', &mut buf)
        .await?;
    *budget -= n;

    if !buf.ends_with(b"\n") {
        let reason = if *budget == 0 {
            "Request head too large"
        } else {
            "Incomplete request head"
        };
        return Err(RexError::InvalidRequest(reason.into()));
    }
    let line = String::from_utf8(buf)
        .map_err(|_| RexError::InvalidRequest("Request head is not valid UTF-8".into()))?;
    Ok(line.trim_end().to_string())
}

/// Read one request from `stream`.
///
/// A declared `Content-Length` above `max_body` fails with
/// [`RexError::PayloadTooLarge`] before any of the body is read.
pub async fn read_request<R>(stream: R, max_body: usize) -> Result<HttpRequest, RexError>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut budget = MAX_HEAD_BYTES;

    let request_line = read_head_line(&mut reader, &mut budget).await?;
    let (method, path) = parse_request_line(&request_line)?;

    let mut headers = Vec::new();
    loop {
        let line = read_head_line(&mut reader, &mut budget).await?;
        if line.is_empty() {
            break;
        }
        if headers.len() == MAX_HEADERS {
            return Err(RexError::InvalidRequest("Too many request headers".into()));
        }
        headers.push(parse_header_line(&line)?);
    }

    let mut request = HttpRequest {
        method,
        path,
        headers,
        body: Vec::new(),
    };

    if request
        .header("transfer-encoding")
        .is_some_and(|te| te.to_ascii_lowercase().contains("chunked"))
    {
        return Err(RexError::InvalidRequest(
            "Chunked request bodies are not supported".into(),
        ));
    }

    let length = match request.header("content-length") {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| RexError::InvalidRequest("Invalid Content-Length".into()))?,
        None => 0,
    };
    if length > max_body {
        return Err(RexError::PayloadTooLarge {
            size: length,
            limit: max_body,
        });
    }

    request.body = vec![0u8; length];
    reader
        .read_exact(&mut request.body)
        .await
        .map_err(|_| {
            RexError::InvalidRequest("Request body shorter than Content-Length".into())
        })?;
    debug!(
        method = %request.method,
        path = %request.path,
        body_bytes = length,
        "request read"
    );
    Ok(request)
}

// ── Response ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn json(status: StatusCode, body: &Value) -> Self {
        let mut response = Self::new(status).with_header("Content-Type", "application/json");
        response.body = body.to_string().into_bytes();
        response
    }

    /// `{"success": false, "error": "..."}` with the error's status.
    pub fn error(err: &RexError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self::json(status, &json!({"success": false, "error": err.user_message()}))
    }

    /// Binary attachment carrying an export.
    pub fn attachment(outcome: ExportOutcome) -> Self {
        let mut response = Self::new(StatusCode::OK)
            .with_header("Content-Type", outcome.content_type)
            .with_header(
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", outcome.filename),
            )
            .with_header("ETag", format!("\"{}\"", outcome.digest))
            .with_header("Cache-Control", "no-store")
            .with_header("Access-Control-Expose-Headers", "Content-Disposition, ETag");
        response.body = outcome.bytes;
        response
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Serialize status line, headers and body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\n",
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("Unknown")
        );
        for (name, value) in &self.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str(&format!(
            "Content-Length: {}\r\nConnection: close\r\n\r\n",
            self.body.len()
        ));

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }

    pub async fn write_to<W>(&self, stream: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        stream.write_all(&self.to_bytes()).await?;
        stream.flush().await
    }
}

// ── Routing ──────────────────────────────────────────────────────────

/// Dispatch a parsed request. Runs the export inline, so callers on an
/// async runtime should invoke this from a blocking task.
pub fn route(exporter: &Exporter, request: &HttpRequest) -> HttpResponse {
    let method = request.method.clone();
    let response = match request.path.as_str() {
        EXPORT_PATH if method == Method::POST => match exporter.export_bytes(&request.body) {
            Ok(outcome) => HttpResponse::attachment(outcome),
            Err(e) => {
                warn!(
                    status = e.status_code(),
                    category = ?e.category(),
                    "export failed: {e}"
                );
                HttpResponse::error(&e)
            }
        },
        EXPORT_PATH if method == Method::OPTIONS => HttpResponse::new(StatusCode::OK)
            .with_header("Access-Control-Allow-Methods", ALLOWED_METHODS)
            .with_header("Access-Control-Allow-Headers", ALLOWED_HEADERS)
            .with_header("Access-Control-Max-Age", CORS_MAX_AGE),
        EXPORT_PATH => method_not_allowed(ALLOWED_METHODS),
        HEALTH_PATH if method == Method::GET => HttpResponse::json(
            StatusCode::OK,
            &json!({"status": "ok", "version": env!("CARGO_PKG_VERSION")}),
        ),
        HEALTH_PATH => method_not_allowed("GET"),
        _ => HttpResponse::json(
            StatusCode::NOT_FOUND,
            &json!({"success": false, "error": "Not found"}),
        ),
    };
    with_cors(response)
}

fn method_not_allowed(allow: &str) -> HttpResponse {
    HttpResponse::json(
        StatusCode::METHOD_NOT_ALLOWED,
        &json!({"success": false, "error": "Method not allowed"}),
    )
    .with_header("Allow", allow)
}

/// Every response carries the permissive origin header.
pub fn with_cors(response: HttpResponse) -> HttpResponse {
    if response.header("Access-Control-Allow-Origin").is_some() {
        return response;
    }
    response.with_header("Access-Control-Allow-Origin", "*")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportSettings;
    use rex_shield::PayloadGuard;

    fn exporter() -> Exporter {
        Exporter::new(ExportSettings::default(), PayloadGuard::default())
    }

    fn body_json(response: &HttpResponse) -> Value {
        serde_json::from_slice(&response.body).unwrap()
    }

    #[test]
    fn test_parse_request_line_strips_query() {
        let (method, path) = parse_request_line("POST /api/export?debug=1 HTTP/1.1").unwrap();
        assert_eq!(method, Method::POST);
        assert_eq!(path, "/api/export");
    }

    #[test]
    fn test_parse_request_line_rejects_garbage() {
        assert!(parse_request_line("hello").is_err());
        assert!(parse_request_line("GET / SPDY/3").is_err());
    }

    #[tokio::test]
    async fn test_read_request_with_body() {
        let raw = b"POST /api/export HTTP/1.1\r\nHost: x\r\nContent-Length: 2\r\n\r\n{}";
        let request = read_request(&raw[..], 1024).await.unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.header("HOST"), Some("x"));
        assert_eq!(request.body, b"{}");
    }

    #[tokio::test]
    async fn test_read_request_over_limit() {
        let raw = b"POST /api/export HTTP/1.1\r\nContent-Length: 5000\r\n\r\n";
        let err = read_request(&raw[..], 1024).await.unwrap_err();
        assert_eq!(err.status_code(), 413);
    }

    #[tokio::test]
    async fn test_read_request_truncated_body() {
        let raw = b"POST /api/export HTTP/1.1\r\nContent-Length: 10\r\n\r\n{}";
        let err = read_request(&raw[..], 1024).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_read_request_non_utf8_header() {
        let raw = b"POST /api/export HTTP/1.1\r\nX-Name: caf\xe9\r\n\r\n";
        let err = read_request(&raw[..], 1024).await.unwrap_err();
        assert!(matches!(err, RexError::InvalidRequest(_)), "{err:?}");
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_read_request_head_is_capped() {
        let mut raw = b"GET /health HTTP/1.1\r\nX-Big: ".to_vec();
        raw.resize(raw.len() + 5 * 1024 * 1024, b'a');
        let mut remaining = &raw[..];

        let err = read_request(&mut remaining, 1024).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("too large"));
        // Only the head budget plus one read buffer was pulled off the stream.
        assert!(raw.len() - remaining.len() <= MAX_HEAD_BYTES + 8 * 1024);
    }

    #[tokio::test]
    async fn test_read_request_too_many_headers() {
        let mut raw = b"GET /health HTTP/1.1\r\n".to_vec();
        for i in 0..=MAX_HEADERS {
            raw.extend_from_slice(format!("X-{i}: 1\r\n").as_bytes());
        }
        raw.extend_from_slice(b"\r\n");
        let err = read_request(&raw[..], 1024).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_read_request_rejects_chunked() {
        let raw = b"POST /api/export HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n";
        let err = read_request(&raw[..], 1024).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_preflight() {
        let response = route(&exporter(), &HttpRequest::new(Method::OPTIONS, EXPORT_PATH));
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(
            response.header("Access-Control-Allow-Methods"),
            Some("POST, OPTIONS")
        );
        assert_eq!(
            response.header("Access-Control-Allow-Headers"),
            Some("Content-Type, Authorization")
        );
    }

    #[test]
    fn test_health() {
        let response = route(&exporter(), &HttpRequest::new(Method::GET, HEALTH_PATH));
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(body_json(&response)["status"], "ok");
    }

    #[test]
    fn test_unknown_route_and_method() {
        let response = route(&exporter(), &HttpRequest::new(Method::GET, "/nope"));
        assert_eq!(response.status, StatusCode::NOT_FOUND);

        let response = route(&exporter(), &HttpRequest::new(Method::GET, EXPORT_PATH));
        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.header("Allow"), Some("POST, OPTIONS"));
    }

    #[test]
    fn test_export_error_body() {
        let request = HttpRequest::new(Method::POST, EXPORT_PATH).with_body("{oops");
        let response = route(&exporter(), &request);
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        let body = body_json(&response);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
    }

    #[test]
    fn test_export_success_headers() {
        let request = HttpRequest::new(Method::POST, EXPORT_PATH).with_body(
            r#"{"extractedData":{"documentType":"lease_agreement","data":{"parties":{"tenant":"Foo"}}}}"#,
        );
        let response = route(&exporter(), &request);
        assert_eq!(response.status, StatusCode::OK);
        let disposition = response.header("Content-Disposition").unwrap();
        assert!(disposition.starts_with("attachment; filename=\"extracted_data_lease_agreement_"));
        assert!(disposition.ends_with(".xlsx\""));
        assert_eq!(response.header("ETag").map(str::len), Some(66));
    }

    #[test]
    fn test_response_serialization() {
        let bytes = HttpResponse::json(StatusCode::OK, &json!({"a": 1})).to_bytes();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Content-Length: 7\r\n"));
        assert!(text.ends_with("\r\n\r\n{\"a\":1}"));
    }
}
