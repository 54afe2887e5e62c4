//! Request body construction.
//!
//! Turns a validated [`BodySpec`] plus the run's variable pool into a
//! [`RequestPayload`]. File fields are resolved through the pool's typed
//! lookup and fetched through the [`FileResolver`]. Any failure aborts the
//! whole build; a partial body is never returned.

use bytes::Bytes;

use super::entities::{BodySpec, FormField};
use crate::errors::HttpRequestError;
use crate::traits::FileResolver;
use crate::types::{File, FilePart, FormFields, RequestPayload};
use crate::variable_pool::{VariableLookup, VariablePool};

/// A built body and the `Content-Type` it implies, if any.
///
/// Multipart bodies carry no content type here; the transport owns the
/// boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltBody {
    pub payload: RequestPayload,
    pub content_type: Option<String>,
}

impl BuiltBody {
    fn new(payload: RequestPayload, content_type: Option<&str>) -> Self {
        Self {
            payload,
            content_type: content_type.map(str::to_string),
        }
    }
}

/// Build the outbound payload for `spec`.
///
/// Field order is preserved: text fields and file parts each appear in
/// declaration order, and an array file variable contributes one part per
/// element, in array order, all under the field's key. A repeated text key
/// keeps its first position and its last value.
pub async fn build_body(
    spec: &BodySpec,
    pool: &VariablePool,
    resolver: &dyn FileResolver,
) -> Result<BuiltBody, HttpRequestError> {
    match spec {
        BodySpec::None => Ok(BuiltBody::new(RequestPayload::Empty, None)),
        BodySpec::RawText { template } => {
            let text = pool.render_template(template);
            Ok(BuiltBody::new(
                RequestPayload::Content(Bytes::from(text)),
                Some("text/plain"),
            ))
        }
        BodySpec::Json { template } => {
            let text = pool.render_template(template);
            if text.trim().is_empty() {
                return Ok(BuiltBody::new(RequestPayload::Empty, None));
            }
            serde_json::from_str::<serde_json::Value>(&text).map_err(|e| {
                HttpRequestError::InvalidRequest {
                    message: format!("JSON body does not parse: {e}"),
                }
            })?;
            Ok(BuiltBody::new(
                RequestPayload::Content(Bytes::from(text)),
                Some("application/json"),
            ))
        }
        BodySpec::UrlEncoded { fields } => {
            let data = fields
                .iter()
                .map(|(k, v)| (pool.render_template(k), pool.render_template(v)))
                .collect();
            Ok(BuiltBody::new(
                RequestPayload::Form(data),
                Some("application/x-www-form-urlencoded"),
            ))
        }
        BodySpec::FormData { fields } => {
            let mut data = FormFields::new();
            let mut files = Vec::new();
            // Each distinct file is fetched once per build.
            let mut fetched: Vec<(File, Bytes)> = Vec::new();
            for field in fields {
                match field {
                    FormField::Text { key, value } => {
                        data.insert(pool.render_template(key), pool.render_template(value));
                    }
                    FormField::File { key, selector } => {
                        let key = pool.render_template(key);
                        for file in form_files(pool, selector)? {
                            let content = match fetched.iter().find(|(f, _)| *f == file) {
                                Some((_, bytes)) => bytes.clone(),
                                None => {
                                    let bytes = fetch(resolver, &file, selector).await?;
                                    fetched.push((file.clone(), bytes.clone()));
                                    bytes
                                }
                            };
                            files.push(FilePart {
                                key: key.clone(),
                                filename: file.filename().map(str::to_string),
                                content,
                                mime_type: file.mime_type_or_default().to_string(),
                            });
                        }
                    }
                }
            }
            Ok(BuiltBody::new(
                RequestPayload::Multipart { data, files },
                None,
            ))
        }
        BodySpec::Binary { selector } => {
            let file = match pool.lookup(selector) {
                VariableLookup::File(file) => file,
                VariableLookup::Absent => return Err(not_found(selector)),
                VariableLookup::FileArray(_) | VariableLookup::Scalar(_) => {
                    return Err(HttpRequestError::ReferenceResolution {
                        selector: selector.join("."),
                        reason: "binary body needs a single file variable".into(),
                    })
                }
            };
            let content = fetch(resolver, &file, selector).await?;
            Ok(BuiltBody::new(
                RequestPayload::Content(content),
                Some(file.mime_type_or_default()),
            ))
        }
    }
}

/// Files referenced by a form-data file field, in order.
fn form_files(pool: &VariablePool, selector: &[String]) -> Result<Vec<File>, HttpRequestError> {
    match pool.lookup(selector) {
        VariableLookup::File(file) => Ok(vec![file]),
        VariableLookup::FileArray(files) => Ok(files),
        VariableLookup::Absent => Err(not_found(selector)),
        VariableLookup::Scalar(segment) => Err(HttpRequestError::TypeMismatch {
            selector: selector.join("."),
            expected: "file or array[file]",
            found: segment.type_name(),
        }),
    }
}

async fn fetch(
    resolver: &dyn FileResolver,
    file: &File,
    selector: &[String],
) -> Result<Bytes, HttpRequestError> {
    resolver
        .fetch(file)
        .await
        .map_err(|source| HttpRequestError::FileFetch {
            selector: selector.join("."),
            source,
        })
}

fn not_found(selector: &[String]) -> HttpRequestError {
    HttpRequestError::ReferenceResolution {
        selector: selector.join("."),
        reason: "not found in variable pool".into(),
    }
}
