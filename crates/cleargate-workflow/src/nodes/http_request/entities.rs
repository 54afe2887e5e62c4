//! Configuration document for the HTTP request node, and its validated form.
//!
//! [`HttpRequestNodeData`] mirrors the document exchanged with the editor.
//! It is converted once, at node construction, into [`RequestSpec`], whose
//! body is a tagged union carrying only what each body kind needs.

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::types::{HttpMethod, Selector};

// ---------------------------------------------------------------------------
// Wire document
// ---------------------------------------------------------------------------

/// The node's `data` block as stored in a workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HttpRequestNodeData {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    pub method: HttpMethod,
    pub url: String,
    pub authorization: HttpRequestNodeAuthorization,
    /// Newline-separated `key:value` lines; may contain variable tokens.
    #[serde(default)]
    pub headers: String,
    /// Newline-separated `key:value` lines; may contain variable tokens.
    #[serde(default)]
    pub params: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<HttpRequestNodeBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<HttpRequestNodeTimeout>,
    /// Treat non-2xx responses as node failures. Default: `false`.
    #[serde(default)]
    pub fail_on_error_status: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizationType {
    #[serde(rename = "no-auth")]
    NoAuth,
    #[serde(rename = "api-key")]
    ApiKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiKeyKind {
    Basic,
    Bearer,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationConfig {
    #[serde(rename = "type")]
    pub kind: ApiKeyKind,
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequestNodeAuthorization {
    #[serde(rename = "type")]
    pub auth_type: AuthorizationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<AuthorizationConfig>,
}

impl HttpRequestNodeAuthorization {
    pub fn no_auth() -> Self {
        Self {
            auth_type: AuthorizationType::NoAuth,
            config: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyType {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "raw-text")]
    RawText,
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "form-data")]
    FormData,
    #[serde(rename = "x-www-form-urlencoded")]
    UrlEncoded,
    #[serde(rename = "binary")]
    Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyDataType {
    Text,
    File,
}

/// One entry of the body's `data` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyData {
    #[serde(default)]
    pub key: String,
    #[serde(rename = "type")]
    pub kind: BodyDataType,
    #[serde(default)]
    pub value: String,
    /// Pool selector for file items.
    #[serde(default)]
    pub file: Vec<String>,
}

impl BodyData {
    pub fn text(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: BodyDataType::Text,
            value: value.into(),
            file: Vec::new(),
        }
    }

    pub fn file(key: impl Into<String>, selector: &[&str]) -> Self {
        Self {
            key: key.into(),
            kind: BodyDataType::File,
            value: String::new(),
            file: selector.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequestNodeBody {
    #[serde(rename = "type")]
    pub body_type: BodyType,
    #[serde(default)]
    pub data: Vec<BodyData>,
}

/// Per-node timeouts in seconds. Missing or zero means "use the maximum".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequestNodeTimeout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write: Option<u64>,
}

// ---------------------------------------------------------------------------
// Validated form
// ---------------------------------------------------------------------------

/// A form-data entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    /// Key and value are templates.
    Text { key: String, value: String },
    /// Key is a template; the selector must resolve to a file or file array.
    File { key: String, selector: Selector },
}

/// How the request body is built. Each variant carries only its own inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodySpec {
    None,
    RawText { template: String },
    Json { template: String },
    UrlEncoded { fields: Vec<(String, String)> },
    FormData { fields: Vec<FormField> },
    Binary { selector: Selector },
}

/// Authorization header to attach, with the key still a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSpec {
    pub kind: ApiKeyKind,
    pub api_key: String,
    pub header: String,
}

/// Validated request shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub url: String,
    pub headers: String,
    pub params: String,
    pub auth: Option<AuthSpec>,
    pub body: BodySpec,
    pub timeout: HttpRequestNodeTimeout,
    pub fail_on_error_status: bool,
}

impl TryFrom<&HttpRequestNodeData> for RequestSpec {
    type Error = ConfigError;

    fn try_from(data: &HttpRequestNodeData) -> Result<Self, Self::Error> {
        if data.url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "url" });
        }
        let body = match &data.body {
            Some(body) => BodySpec::try_from(body)?,
            None => BodySpec::None,
        };
        Ok(Self {
            method: data.method,
            url: data.url.clone(),
            headers: data.headers.clone(),
            params: data.params.clone(),
            auth: auth_spec(&data.authorization)?,
            body,
            timeout: data.timeout.unwrap_or_default(),
            fail_on_error_status: data.fail_on_error_status,
        })
    }
}

fn auth_spec(auth: &HttpRequestNodeAuthorization) -> Result<Option<AuthSpec>, ConfigError> {
    match auth.auth_type {
        AuthorizationType::NoAuth => Ok(None),
        AuthorizationType::ApiKey => {
            let config = auth.config.as_ref().ok_or(ConfigError::MissingField {
                field: "authorization.config",
            })?;
            if config.api_key.is_empty() {
                return Err(ConfigError::MissingField {
                    field: "authorization.config.api_key",
                });
            }
            let header = match (config.kind, config.header.as_deref()) {
                (ApiKeyKind::Custom, Some(h)) if !h.trim().is_empty() => h.trim().to_string(),
                _ => "Authorization".to_string(),
            };
            Ok(Some(AuthSpec {
                kind: config.kind,
                api_key: config.api_key.clone(),
                header,
            }))
        }
    }
}

fn file_selector(item: &BodyData) -> Result<Selector, ConfigError> {
    if item.file.len() < 2 {
        return Err(ConfigError::Invalid {
            message: format!(
                "file field {:?} needs a selector of at least 2 elements, got {:?}",
                item.key, item.file
            ),
        });
    }
    Ok(item.file.clone())
}

impl TryFrom<&HttpRequestNodeBody> for BodySpec {
    type Error = ConfigError;

    fn try_from(body: &HttpRequestNodeBody) -> Result<Self, Self::Error> {
        let first_value = || body.data.first().map(|d| d.value.clone()).unwrap_or_default();
        match body.body_type {
            BodyType::None => Ok(Self::None),
            BodyType::RawText => Ok(Self::RawText {
                template: first_value(),
            }),
            BodyType::Json => Ok(Self::Json {
                template: first_value(),
            }),
            BodyType::UrlEncoded => {
                let fields = body
                    .data
                    .iter()
                    .map(|item| match item.kind {
                        BodyDataType::Text => Ok((item.key.clone(), item.value.clone())),
                        BodyDataType::File => Err(ConfigError::Invalid {
                            message: format!(
                                "x-www-form-urlencoded body cannot carry file field {:?}",
                                item.key
                            ),
                        }),
                    })
                    .collect::<Result<_, _>>()?;
                Ok(Self::UrlEncoded { fields })
            }
            BodyType::FormData => {
                let fields = body
                    .data
                    .iter()
                    .map(|item| match item.kind {
                        BodyDataType::Text => Ok(FormField::Text {
                            key: item.key.clone(),
                            value: item.value.clone(),
                        }),
                        BodyDataType::File => Ok(FormField::File {
                            key: item.key.clone(),
                            selector: file_selector(item)?,
                        }),
                    })
                    .collect::<Result<_, ConfigError>>()?;
                Ok(Self::FormData { fields })
            }
            BodyType::Binary => match body.data.as_slice() {
                [item] if item.kind == BodyDataType::File => Ok(Self::Binary {
                    selector: file_selector(item)?,
                }),
                _ => Err(ConfigError::Invalid {
                    message: format!(
                        "binary body needs exactly one file field, got {} field(s)",
                        body.data.len()
                    ),
                }),
            },
        }
    }
}
