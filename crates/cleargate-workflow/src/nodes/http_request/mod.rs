//! HTTP request node.
//!
//! Renders its configured request against the run's variable pool, builds
//! the body (raw, JSON, url-encoded, multipart or a single binary file),
//! sends it through the context's transport, and reports the response as a
//! [`NodeRunResult`]. Every failure is captured in the result.

pub mod body;
pub mod entities;
pub mod executor;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::HttpRequestConfig;
use crate::errors::{ConfigError, HttpRequestError};
use crate::node_ctx::NodeCtx;
use crate::traits::Node;
use crate::types::{NodeRunResult, Selector, TransportResponse};
use crate::variable_pool::VariablePool;

pub use body::{build_body, BuiltBody};
pub use entities::{
    ApiKeyKind, AuthorizationConfig, AuthorizationType, BodyData, BodyDataType, BodySpec,
    BodyType, FormField, HttpRequestNodeAuthorization, HttpRequestNodeBody, HttpRequestNodeData,
    HttpRequestNodeTimeout, RequestSpec,
};
pub use executor::{build_request, parse_key_values};

/// `{"id": ..., "data": {...}}` as found in a graph's node list.
#[derive(Deserialize)]
struct NodeConfigDocument {
    id: String,
    data: HttpRequestNodeData,
}

/// A configured HTTP request node.
pub struct HttpRequestNode {
    id: String,
    data: HttpRequestNodeData,
    spec: RequestSpec,
    config: HttpRequestConfig,
}

impl HttpRequestNode {
    /// Validate `data` and build a node using default limits.
    pub fn new(id: impl Into<String>, data: HttpRequestNodeData) -> Result<Self, ConfigError> {
        let spec = RequestSpec::try_from(&data)?;
        Ok(Self {
            id: id.into(),
            data,
            spec,
            config: HttpRequestConfig::default(),
        })
    }

    /// Build from a graph node document: `{"id": "...", "data": {...}}`.
    pub fn from_config(config: &Value) -> Result<Self, ConfigError> {
        let doc = NodeConfigDocument::deserialize(config)?;
        if doc.id.is_empty() {
            return Err(ConfigError::MissingField { field: "id" });
        }
        Self::new(doc.id, doc.data)
    }

    /// Replace the timeout caps and response size limits.
    pub fn with_config(mut self, config: HttpRequestConfig) -> Self {
        self.config = config;
        self
    }

    pub fn data(&self) -> &HttpRequestNodeData {
        &self.data
    }

    /// Headers whose values are masked in the request log.
    fn masked_headers(&self) -> Vec<&str> {
        match &self.spec.auth {
            Some(auth) => vec!["Authorization", auth.header.as_str()],
            None => vec!["Authorization"],
        }
    }

    /// Pool values this request reads, keyed by dotted selector. The API
    /// key template is left out.
    fn inputs(&self, pool: &VariablePool) -> BTreeMap<String, Value> {
        let spec = &self.spec;
        let mut templates = vec![spec.url.as_str(), spec.headers.as_str(), spec.params.as_str()];
        let mut selectors: Vec<Selector> = Vec::new();
        match &spec.body {
            BodySpec::None => {}
            BodySpec::RawText { template } | BodySpec::Json { template } => {
                templates.push(template)
            }
            BodySpec::UrlEncoded { fields } => {
                for (k, v) in fields {
                    templates.push(k);
                    templates.push(v);
                }
            }
            BodySpec::FormData { fields } => {
                for field in fields {
                    match field {
                        FormField::Text { key, value } => {
                            templates.push(key);
                            templates.push(value);
                        }
                        FormField::File { key, selector } => {
                            templates.push(key);
                            selectors.push(selector.clone());
                        }
                    }
                }
            }
            BodySpec::Binary { selector } => selectors.push(selector.clone()),
        }
        for template in templates {
            selectors.extend(VariablePool::template_selectors(template));
        }

        selectors
            .into_iter()
            .filter_map(|selector| {
                let segment = pool.get(selector.as_slice())?;
                Some((selector.join("."), segment.to_value()))
            })
            .collect()
    }

    fn check_response(&self, response: &TransportResponse) -> Result<(), HttpRequestError> {
        let limit = if response.is_file() {
            self.config.max_binary_size
        } else {
            self.config.max_text_size
        };
        if response.body.len() > limit {
            return Err(HttpRequestError::ResponseTooLarge {
                size: response.body.len(),
                limit,
            });
        }
        if self.spec.fail_on_error_status && !response.is_success() {
            return Err(HttpRequestError::HttpStatus {
                status: response.status,
            });
        }
        Ok(())
    }
}

/// File responses leave `body` empty; their bytes are not text.
fn outputs(response: &TransportResponse) -> BTreeMap<String, Value> {
    let body = if response.is_file() {
        String::new()
    } else {
        response.text()
    };
    BTreeMap::from([
        ("status_code".to_string(), json!(response.status)),
        ("body".to_string(), Value::String(body)),
        ("headers".to_string(), json!(response.header_map())),
    ])
}

#[async_trait]
impl Node for HttpRequestNode {
    fn node_type(&self) -> &'static str {
        "http-request"
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.data.title
    }

    async fn run(&self, ctx: &NodeCtx) -> NodeRunResult {
        let inputs = self.inputs(ctx.variable_pool());
        let mut process_data = BTreeMap::new();

        let request = match build_request(
            &self.spec,
            &self.config,
            ctx.variable_pool(),
            ctx.file_resolver(),
        )
        .await
        {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(
                    run_id = ctx.run_id(),
                    node_id = %self.id,
                    error = %e,
                    "failed to build HTTP request"
                );
                return NodeRunResult::failed(e.kind(), e.to_string(), inputs, process_data);
            }
        };

        process_data.insert(
            "request".to_string(),
            Value::String(request.to_log(&self.masked_headers())),
        );
        tracing::debug!(
            run_id = ctx.run_id(),
            node_id = %self.id,
            method = %request.method,
            url = %request.url,
            "sending HTTP request"
        );

        let response = match ctx.transport().send(request).await {
            Ok(response) => response,
            Err(e) => {
                let e = HttpRequestError::from(e);
                tracing::warn!(
                    run_id = ctx.run_id(),
                    node_id = %self.id,
                    error = %e,
                    "HTTP request failed"
                );
                return NodeRunResult::failed(e.kind(), e.to_string(), inputs, process_data);
            }
        };

        if let Err(e) = self.check_response(&response) {
            tracing::warn!(
                run_id = ctx.run_id(),
                node_id = %self.id,
                status = response.status,
                error = %e,
                "HTTP response rejected"
            );
            return NodeRunResult::failed(e.kind(), e.to_string(), inputs, process_data);
        }

        tracing::debug!(
            run_id = ctx.run_id(),
            node_id = %self.id,
            status = response.status,
            bytes = response.body.len(),
            "HTTP request completed"
        );
        NodeRunResult::succeeded(inputs, process_data, outputs(&response))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::defaults::ReqwestTransport;
    use crate::errors::{FileFetchError, TransportError};
    use crate::node_ctx::{FnFileResolver, TestNodeCtx};
    use crate::types::{
        ErrorKind, File, FilePart, FileTransferMethod, FileType, FormFields, GraphInitParams,
        NodeExecutionStatus, RequestPayload, Variable,
    };
    use crate::variable_pool::SystemVariables;

    fn node(body: Value) -> HttpRequestNode {
        HttpRequestNode::from_config(&json!({
            "id": "1",
            "data": {
                "title": "http",
                "desc": "",
                "method": "post",
                "url": "http://example.org/post",
                "authorization": {"type": "no-auth", "config": null},
                "headers": "",
                "params": "",
                "body": body,
            }
        }))
        .unwrap()
    }

    fn image() -> File {
        File::builder("1", FileType::Image, FileTransferMethod::LocalFile)
            .related_id("1111")
            .build()
    }

    fn upload_files() -> Vec<File> {
        vec![
            File::builder("1", FileType::Image, FileTransferMethod::LocalFile)
                .related_id("file1")
                .filename("image1.jpg")
                .mime_type("image/jpeg")
                .build(),
            File::builder("1", FileType::Document, FileTransferMethod::LocalFile)
                .related_id("file2")
                .filename("document.pdf")
                .mime_type("application/pdf")
                .build(),
        ]
    }

    #[tokio::test]
    async fn test_binary_body_round_trips() {
        let node = node(json!({
            "type": "binary",
            "data": [{"key": "", "type": "file", "value": "", "file": ["1111", "file"]}]
        }));
        let (ctx, inspector) = TestNodeCtx::builder()
            .variable(&["1111", "file"], Variable::file("file", image()))
            .file_bytes(b"test")
            .build();

        let result = node.run(&ctx).await;
        assert_eq!(result.status, NodeExecutionStatus::Succeeded);
        assert_eq!(result.outputs["body"], json!("test"));
        assert_eq!(result.outputs["status_code"], json!(200));

        let sent = inspector.sent_requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].payload,
            RequestPayload::Content(Bytes::from_static(b"test"))
        );
        assert_eq!(sent[0].header("content-type"), Some("application/octet-stream"));
    }

    #[tokio::test]
    async fn test_form_data_with_file_and_text() {
        let node = node(json!({
            "type": "form-data",
            "data": [
                {"key": "file", "type": "file", "value": "", "file": ["1111", "file"]},
                {"key": "name", "type": "text", "value": "test", "file": []}
            ]
        }));
        let (ctx, inspector) = TestNodeCtx::builder()
            .variable(&["1111", "file"], Variable::file("file", image()))
            .file_bytes(b"test")
            .build();

        let result = node.run(&ctx).await;
        assert!(result.is_success(), "{:?}", result.error);

        let sent = inspector.sent_requests();
        assert_eq!(
            sent[0].payload.data().unwrap(),
            &FormFields::from([("name", "test")])
        );
        assert_eq!(
            sent[0].payload.files().unwrap(),
            &[FilePart {
                key: "file".into(),
                filename: None,
                content: Bytes::from_static(b"test"),
                mime_type: "application/octet-stream".into(),
            }]
        );
        assert_eq!(sent[0].header("content-type"), None);
    }

    #[tokio::test]
    async fn test_form_data_with_file_array() {
        let node = node(json!({
            "type": "form-data",
            "data": [
                {"key": "files", "type": "file", "file": ["1111", "files"]},
                {"key": "name", "type": "text", "value": "test"}
            ]
        }));
        let (ctx, inspector) = TestNodeCtx::builder()
            .variable(&["1111", "files"], Variable::file_array("files", upload_files()))
            .resolve_with(|file| {
                Ok(if file.mime_type() == Some("image/jpeg") {
                    Bytes::from_static(b"test_image_data")
                } else {
                    Bytes::from_static(b"test_pdf_data")
                })
            })
            .respond_with(|_| {
                Ok(TransportResponse::new(200, r#"{"status":"success"}"#)
                    .with_header("Content-Type", "application/json"))
            })
            .build();

        let result = node.run(&ctx).await;
        assert!(result.is_success(), "{:?}", result.error);
        assert_eq!(result.outputs["body"], json!(r#"{"status":"success"}"#));
        assert_eq!(
            result.outputs["headers"],
            json!({"content-type": "application/json"})
        );

        let sent = inspector.sent_requests();
        let files = sent[0].payload.files().unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| f.key == "files"));
        let mut mimes: Vec<&str> = files.iter().map(|f| f.mime_type.as_str()).collect();
        mimes.sort_unstable();
        assert_eq!(mimes, ["application/pdf", "image/jpeg"]);
        let mut contents: Vec<&[u8]> = files.iter().map(|f| &f.content[..]).collect();
        contents.sort_unstable();
        assert_eq!(contents, [&b"test_image_data"[..], &b"test_pdf_data"[..]]);
        assert_eq!(inspector.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_variable_fails_without_sending() {
        let node = node(json!({
            "type": "binary",
            "data": [{"type": "file", "file": ["1111", "file"]}]
        }));
        let (ctx, inspector) = TestNodeCtx::builder().file_bytes(b"test").build();

        let result = node.run(&ctx).await;
        assert_eq!(result.status, NodeExecutionStatus::Failed);
        assert_eq!(
            result.error.unwrap().kind,
            ErrorKind::ReferenceResolution
        );
        assert!(inspector.sent_requests().is_empty());
        assert_eq!(inspector.fetch_count(), 0);
        assert!(!result.process_data.contains_key("request"));
    }

    #[tokio::test]
    async fn test_scalar_in_file_field_is_type_mismatch() {
        let node = node(json!({
            "type": "form-data",
            "data": [{"key": "file", "type": "file", "file": ["1111", "file"]}]
        }));
        let (ctx, inspector) = TestNodeCtx::builder()
            .variable(&["1111", "file"], Variable::new("file", "not a file"))
            .build();

        let result = node.run(&ctx).await;
        assert_eq!(result.error.unwrap().kind, ErrorKind::TypeMismatch);
        assert!(inspector.sent_requests().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_is_reported() {
        let node = node(json!({
            "type": "binary",
            "data": [{"type": "file", "file": ["1111", "file"]}]
        }));
        let (ctx, inspector) = TestNodeCtx::builder()
            .variable(&["1111", "file"], Variable::file("file", image()))
            .resolve_with(|_| {
                Err(FileFetchError::Download {
                    message: "storage offline".into(),
                })
            })
            .build();

        let result = node.run(&ctx).await;
        let error = result.error.unwrap();
        assert_eq!(error.kind, ErrorKind::FileFetch);
        assert!(error.message.contains("storage offline"));
        assert!(inspector.sent_requests().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_reported() {
        let node = node(json!({"type": "raw-text", "data": [{"type": "text", "value": "hi"}]}));
        let (ctx, inspector) = TestNodeCtx::builder()
            .respond_with(|_| {
                Err(TransportError::Timeout {
                    message: "read timed out".into(),
                })
            })
            .build();

        let result = node.run(&ctx).await;
        assert_eq!(result.status, NodeExecutionStatus::Failed);
        assert_eq!(result.error.unwrap().kind, ErrorKind::Transport);
        assert!(result.outputs.is_empty());
        assert!(result.process_data.contains_key("request"));
        assert_eq!(inspector.sent_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let node = node(json!({
            "type": "json",
            "data": [{"type": "text", "value": "{\"q\": {{#start.q#}}}"}]
        }));
        let (ctx, inspector) = TestNodeCtx::builder()
            .variable(&["start", "q"], Variable::new("q", "unquoted"))
            .build();

        let result = node.run(&ctx).await;
        assert_eq!(result.error.unwrap().kind, ErrorKind::InvalidRequest);
        assert!(inspector.sent_requests().is_empty());
    }

    #[tokio::test]
    async fn test_error_status_succeeds_unless_flagged() {
        let respond = |_: &crate::types::OutboundRequest| Ok(TransportResponse::new(500, "oops"));

        let lenient = node(json!({"type": "none", "data": []}));
        let (ctx, _) = TestNodeCtx::builder().respond_with(respond).build();
        let result = lenient.run(&ctx).await;
        assert!(result.is_success());
        assert_eq!(result.outputs["status_code"], json!(500));
        assert_eq!(result.outputs["body"], json!("oops"));

        let mut data = lenient.data().clone();
        data.fail_on_error_status = true;
        let strict = HttpRequestNode::new("1", data).unwrap();
        let (ctx, _) = TestNodeCtx::builder().respond_with(respond).build();
        let result = strict.run(&ctx).await;
        assert_eq!(result.error.unwrap().kind, ErrorKind::HttpStatus);
    }

    #[tokio::test]
    async fn test_response_size_limits() {
        let node = node(json!({"type": "none"})).with_config(HttpRequestConfig {
            max_text_size: 4,
            max_binary_size: 8,
            ..HttpRequestConfig::default()
        });

        let (ctx, _) = TestNodeCtx::builder()
            .respond_with(|_| Ok(TransportResponse::new(200, "too long")))
            .build();
        let result = node.run(&ctx).await;
        assert_eq!(result.error.unwrap().kind, ErrorKind::ResponseTooLarge);

        let (ctx, _) = TestNodeCtx::builder()
            .respond_with(|_| {
                Ok(TransportResponse::new(200, vec![0u8; 8])
                    .with_header("Content-Type", "image/png"))
            })
            .build();
        assert!(node.run(&ctx).await.is_success());
    }

    #[tokio::test]
    async fn test_auth_is_masked_in_request_log() {
        let node = HttpRequestNode::from_config(&json!({
            "id": "1",
            "data": {
                "title": "http",
                "method": "get",
                "url": "http://example.org/items",
                "authorization": {
                    "type": "api-key",
                    "config": {"type": "bearer", "api_key": "{{#start.key#}}"}
                },
                "headers": "X-Trace: {{#sys.workflow_run_id#}}",
                "params": "page:2",
            }
        }))
        .unwrap();
        let pool = Arc::new(VariablePool::new(
            SystemVariables {
                workflow_run_id: Some("run-9".into()),
                ..SystemVariables::empty()
            },
            BTreeMap::new(),
        ));
        let (ctx, inspector) = TestNodeCtx::builder()
            .pool(pool)
            .variable(&["start", "key"], Variable::new("key", "sk-secret"))
            .build();

        let result = node.run(&ctx).await;
        assert!(result.is_success());
        let sent = inspector.sent_requests();
        assert_eq!(sent[0].header("authorization"), Some("Bearer sk-secret"));
        assert_eq!(sent[0].header("x-trace"), Some("run-9"));
        assert_eq!(sent[0].params, vec![("page".to_string(), "2".to_string())]);

        let log = result.process_data["request"].as_str().unwrap();
        assert!(log.starts_with("GET /items?page=2 HTTP/1.1"));
        assert!(log.contains("X-Trace: run-9"));
        assert!(!log.contains("sk-secret"));
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(HttpRequestNode::from_config(&json!({"id": "1"})).is_err());
        let err = HttpRequestNode::from_config(&json!({
            "id": "1",
            "data": {
                "title": "http",
                "method": "trace",
                "url": "http://example.org",
                "authorization": {"type": "no-auth"}
            }
        }));
        assert!(matches!(err, Err(ConfigError::Malformed(_))));

        let err = HttpRequestNode::from_config(&json!({
            "id": "1",
            "data": {
                "title": "http",
                "method": "post",
                "url": "http://example.org",
                "authorization": {"type": "no-auth"},
                "body": {"type": "binary", "data": []}
            }
        }));
        assert!(matches!(err, Err(ConfigError::Invalid { .. })));
    }

    #[tokio::test]
    async fn test_multipart_over_real_transport() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .and(header("x-source", "workflow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_string(r#"{"status":"success"}"#),
            )
            .mount(&server)
            .await;

        let node = HttpRequestNode::from_config(&json!({
            "id": "upload",
            "data": {
                "title": "upload",
                "method": "post",
                "url": format!("{}/upload", server.uri()),
                "authorization": {"type": "no-auth"},
                "headers": "X-Source: workflow",
                "body": {
                    "type": "form-data",
                    "data": [
                        {"key": "files", "type": "file", "file": ["1111", "files"]},
                        {"key": "name", "type": "text", "value": "test"}
                    ]
                }
            }
        }))
        .unwrap();

        let pool = Arc::new(VariablePool::new(SystemVariables::empty(), BTreeMap::new()));
        pool.add(&["1111", "files"], Variable::file_array("files", upload_files()))
            .unwrap();
        let resolver = FnFileResolver::new(|file| {
            Ok(Bytes::from(format!(
                "bytes-of-{}",
                file.filename().unwrap_or_default()
            )))
        });
        let ctx = NodeCtx::new(
            "run-1".into(),
            "upload".into(),
            Arc::new(GraphInitParams::default()),
            pool,
            Arc::new(resolver),
            Arc::new(ReqwestTransport::new(&HttpRequestConfig::default()).unwrap()),
        );

        let result = node.run(&ctx).await;
        assert!(result.is_success(), "{:?}", result.error);
        assert_eq!(result.outputs["body"], json!(r#"{"status":"success"}"#));

        let received = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&received[0].body).into_owned();
        assert!(body.contains("bytes-of-image1.jpg"));
        assert!(body.contains("bytes-of-document.pdf"));
        assert_eq!(body.matches("name=\"files\"").count(), 2);
    }

    #[tokio::test]
    async fn test_form_data_keeps_declared_order_and_single_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/form"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let node = HttpRequestNode::from_config(&json!({
            "id": "form",
            "data": {
                "title": "form",
                "method": "post",
                "url": format!("{}/form", server.uri()),
                "authorization": {"type": "no-auth"},
                "headers": "Content-Type: multipart/form-data",
                "body": {
                    "type": "form-data",
                    "data": [
                        {"key": "zeta", "type": "text", "value": "z"},
                        {"key": "file", "type": "file", "file": ["1111", "file"]},
                        {"key": "alpha", "type": "text", "value": "a"}
                    ]
                }
            }
        }))
        .unwrap();

        let pool = Arc::new(VariablePool::new(SystemVariables::empty(), BTreeMap::new()));
        pool.add(&["1111", "file"], Variable::file("file", image()))
            .unwrap();
        let ctx = NodeCtx::new(
            "run-1".into(),
            "form".into(),
            Arc::new(GraphInitParams::default()),
            pool,
            Arc::new(FnFileResolver::constant(b"test")),
            Arc::new(ReqwestTransport::new(&HttpRequestConfig::default()).unwrap()),
        );

        let result = node.run(&ctx).await;
        assert!(result.is_success(), "{:?}", result.error);

        let received = server.received_requests().await.unwrap();
        let content_types: Vec<_> = received[0]
            .headers
            .get_all("content-type")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();
        assert_eq!(content_types.len(), 1, "{content_types:?}");
        assert!(content_types[0].starts_with("multipart/form-data; boundary="));

        let body = String::from_utf8_lossy(&received[0].body).into_owned();
        let zeta_at = body.find("name=\"zeta\"").unwrap();
        let alpha_at = body.find("name=\"alpha\"").unwrap();
        assert!(zeta_at < alpha_at);
    }

    #[tokio::test]
    async fn test_file_referenced_twice_is_fetched_once() {
        let node = node(json!({
            "type": "form-data",
            "data": [
                {"key": "first", "type": "file", "file": ["1111", "file"]},
                {"key": "second", "type": "file", "file": ["1111", "file"]}
            ]
        }));
        let (ctx, inspector) = TestNodeCtx::builder()
            .variable(&["1111", "file"], Variable::file("file", image()))
            .file_bytes(b"test")
            .build();

        let result = node.run(&ctx).await;
        assert!(result.is_success(), "{:?}", result.error);
        assert_eq!(inspector.fetch_count(), 1);
        assert_eq!(inspector.sent_requests()[0].payload.files().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_file_response_leaves_body_empty() {
        let node = node(json!({"type": "none"}));
        let (ctx, _) = TestNodeCtx::builder()
            .respond_with(|_| {
                Ok(TransportResponse::new(200, vec![0x89, 0x50, 0xff, 0x00])
                    .with_header("Content-Type", "image/png"))
            })
            .build();

        let result = node.run(&ctx).await;
        assert!(result.is_success());
        assert_eq!(result.outputs["body"], json!(""));
        assert_eq!(result.outputs["headers"], json!({"content-type": "image/png"}));
    }

    #[tokio::test]
    async fn test_inputs_record_referenced_values() {
        let node = HttpRequestNode::from_config(&json!({
            "id": "1",
            "data": {
                "title": "http",
                "method": "post",
                "url": "http://example.org/items/{{#start.id#}}",
                "authorization": {
                    "type": "api-key",
                    "config": {"type": "bearer", "api_key": "{{#start.key#}}"}
                },
                "body": {
                    "type": "form-data",
                    "data": [
                        {"key": "file", "type": "file", "file": ["1111", "file"]},
                        {"key": "note", "type": "text", "value": "{{#start.note#}}"}
                    ]
                }
            }
        }))
        .unwrap();
        let (ctx, _) = TestNodeCtx::builder()
            .variable(&["start", "id"], Variable::new("id", json!(7)))
            .variable(&["start", "key"], Variable::new("key", "sk-secret"))
            .variable(&["1111", "file"], Variable::file("file", image()))
            .file_bytes(b"test")
            .build();

        let result = node.run(&ctx).await;
        assert!(result.is_success(), "{:?}", result.error);
        assert_eq!(result.inputs["start.id"], json!(7));
        assert_eq!(result.inputs["1111.file"]["related_id"], json!("1111"));
        assert!(!result.inputs.contains_key("start.key"));
        assert!(!result.inputs.contains_key("start.note"));
    }
}
