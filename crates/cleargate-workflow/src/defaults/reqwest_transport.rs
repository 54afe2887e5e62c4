//! HTTP transport backed by `reqwest`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::config::HttpRequestConfig;
use crate::errors::TransportError;
use crate::traits::HttpTransport;
use crate::types::{
    FilePart, FormFields, HttpMethod, OutboundRequest, RequestPayload, TransportResponse,
};

/// Sends [`OutboundRequest`]s with a shared `reqwest::Client`.
///
/// When SSRF proxy URLs are configured, all egress goes through them; the
/// proxy is what keeps requests away from internal address ranges. The
/// connect timeout is fixed per client; read and write timeouts are summed
/// into a per-request deadline. No retries.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client honoring the proxy and connect-timeout settings in
    /// `config`.
    pub fn new(config: &HttpRequestConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().connect_timeout(config.max_connect_timeout());
        if let Some(url) = &config.ssrf_proxy_http_url {
            builder = builder.proxy(reqwest::Proxy::http(url).map_err(classify)?);
        }
        if let Some(url) = &config.ssrf_proxy_https_url {
            builder = builder.proxy(reqwest::Proxy::https(url).map_err(classify)?);
        }
        let client = builder.build().map_err(classify)?;
        Ok(Self { client })
    }

    /// Wrap an existing client as-is.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Head => reqwest::Method::HEAD,
        HttpMethod::Options => reqwest::Method::OPTIONS,
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout {
            message: e.to_string(),
        }
    } else if e.is_connect() {
        TransportError::Connect {
            message: e.to_string(),
        }
    } else if e.is_builder() {
        TransportError::Request {
            message: e.to_string(),
        }
    } else {
        TransportError::Other {
            message: e.to_string(),
        }
    }
}

fn multipart(data: &FormFields, files: &[FilePart]) -> Result<Form, TransportError> {
    let mut form = Form::new();
    for (key, value) in data.iter() {
        form = form.text(key.to_string(), value.to_string());
    }
    for file in files {
        let mut part = Part::bytes(file.content.to_vec())
            .mime_str(&file.mime_type)
            .map_err(classify)?;
        if let Some(name) = &file.filename {
            part = part.file_name(name.clone());
        }
        form = form.part(file.key.clone(), part);
    }
    Ok(form)
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(method(request.method), &request.url)
            .timeout(request.timeouts.read + request.timeouts.write);
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match &request.payload {
            RequestPayload::Empty => builder,
            RequestPayload::Content(bytes) => builder.body(bytes.clone()),
            RequestPayload::Form(data) => builder.form(data.as_slice()),
            RequestPayload::Multipart { data, files } => builder.multipart(multipart(data, files)?),
        };

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await.map_err(classify)?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
