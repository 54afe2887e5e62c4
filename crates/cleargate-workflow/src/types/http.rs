//! Transport-level request and response shapes.
//!
//! An [`OutboundRequest`] is what the HTTP node hands to an
//! [`HttpTransport`](crate::traits::HttpTransport). Its payload is either raw
//! content or form data plus files, never both.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::str::FromStr;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Method
// ---------------------------------------------------------------------------

/// HTTP methods the request node can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            "put" => Ok(Self::Put),
            "patch" => Ok(Self::Patch),
            "delete" => Ok(Self::Delete),
            "head" => Ok(Self::Head),
            "options" => Ok(Self::Options),
            other => Err(format!("unsupported HTTP method: {other}")),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HttpMethod> for String {
    fn from(method: HttpMethod) -> Self {
        method.as_str().to_ascii_lowercase()
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// One file entry of a multipart body.
///
/// Several parts may share a `key`; that is how multi-file form fields are
/// sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub key: String,
    pub filename: Option<String>,
    pub content: Bytes,
    pub mime_type: String,
}

/// Text form fields in declaration order.
///
/// Inserting an existing key replaces its value in place, so a repeated key
/// keeps the position of its first occurrence and the value of its last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, value: String) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    /// Pairs in order, as serialized into a url-encoded body.
    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

impl<const N: usize> From<[(&str, &str); N]> for FormFields {
    fn from(pairs: [(&str, &str); N]) -> Self {
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

/// The body of an outbound request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestPayload {
    #[default]
    Empty,
    /// Raw bytes sent as-is (binary, JSON, raw text).
    Content(Bytes),
    /// Text fields sent `application/x-www-form-urlencoded`.
    Form(FormFields),
    /// Text fields plus file parts sent `multipart/form-data`, text first.
    Multipart {
        data: FormFields,
        files: Vec<FilePart>,
    },
}

impl RequestPayload {
    /// The raw content, when this payload carries one.
    pub fn content(&self) -> Option<&Bytes> {
        match self {
            Self::Content(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Text form fields, for url-encoded and multipart payloads.
    pub fn data(&self) -> Option<&FormFields> {
        match self {
            Self::Form(data) | Self::Multipart { data, .. } => Some(data),
            _ => None,
        }
    }

    /// File parts, for multipart payloads.
    pub fn files(&self) -> Option<&[FilePart]> {
        match self {
            Self::Multipart { files, .. } => Some(files),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Per-request timeouts, already clamped to configured maxima.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
    pub write: Duration,
}

/// A fully rendered request, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub params: Vec<(String, String)>,
    pub payload: RequestPayload,
    pub timeouts: Timeouts,
}

impl OutboundRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Render an HTTP/1.1-style transcript for run logs.
    ///
    /// Values of headers named in `masked` are replaced with asterisks.
    /// Binary content and file parts are summarized, never dumped.
    pub fn to_log(&self, masked: &[&str]) -> String {
        let mut out = String::new();
        let (host, path) = split_url(&self.url);
        let mut target = path;
        if !self.params.is_empty() {
            let query = self
                .params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("&");
            target.push(if target.contains('?') { '&' } else { '?' });
            target.push_str(&query);
        }
        let _ = write!(out, "{} {} HTTP/1.1\r\n", self.method, target);
        if let Some(host) = host {
            let _ = write!(out, "Host: {host}\r\n");
        }
        for (k, v) in &self.headers {
            if masked.iter().any(|m| m.eq_ignore_ascii_case(k)) {
                let _ = write!(out, "{k}: {}\r\n", "*".repeat(v.len().min(16)));
            } else {
                let _ = write!(out, "{k}: {v}\r\n");
            }
        }
        out.push_str("\r\n");
        match &self.payload {
            RequestPayload::Empty => {}
            RequestPayload::Content(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => out.push_str(text),
                Err(_) => {
                    let _ = write!(out, "<binary: {} bytes>", bytes.len());
                }
            },
            RequestPayload::Form(data) => {
                let body = data
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join("&");
                out.push_str(&body);
            }
            RequestPayload::Multipart { data, files } => {
                for (k, v) in data.iter() {
                    let _ = write!(out, "[field] {k}={v}\r\n");
                }
                for part in files {
                    let _ = write!(
                        out,
                        "[file] {} filename={} type={} ({} bytes)\r\n",
                        part.key,
                        part.filename.as_deref().unwrap_or("-"),
                        part.mime_type,
                        part.content.len()
                    );
                }
            }
        }
        out
    }
}

fn split_url(url: &str) -> (Option<String>, String) {
    match reqwest::Url::parse(url) {
        Ok(parsed) => {
            let host = parsed.host_str().map(|h| match parsed.port() {
                Some(port) => format!("{h}:{port}"),
                None => h.to_string(),
            });
            let mut path = parsed.path().to_string();
            if let Some(q) = parsed.query() {
                path.push('?');
                path.push_str(q);
            }
            (host, path)
        }
        Err(_) => (None, url.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// What the transport returns for any HTTP response, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Whether the body should be treated as a file rather than text.
    ///
    /// `attachment` dispositions are files; otherwise the content type
    /// decides, and a missing content type is text.
    pub fn is_file(&self) -> bool {
        if self
            .header("content-disposition")
            .is_some_and(|d| d.to_ascii_lowercase().starts_with("attachment"))
        {
            return true;
        }
        let Some(content_type) = self.header("content-type") else {
            return false;
        };
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let textual = mime.starts_with("text/")
            || mime.ends_with("+json")
            || mime.ends_with("+xml")
            || matches!(
                mime.as_str(),
                "application/json"
                    | "application/xml"
                    | "application/javascript"
                    | "application/x-www-form-urlencoded"
                    | "application/yaml"
                    | "application/x-yaml"
                    | "application/graphql"
            );
        !textual
    }

    /// Headers as a map with lower-cased names; repeated headers are
    /// comma-joined in arrival order.
    pub fn header_map(&self) -> BTreeMap<String, String> {
        let mut map: BTreeMap<String, String> = BTreeMap::new();
        for (k, v) in &self.headers {
            map.entry(k.to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(v);
                })
                .or_insert_with(|| v.clone());
        }
        map
    }
}
