//! Renders a validated [`RequestSpec`] into an [`OutboundRequest`].

use std::time::Duration;

use base64::Engine as _;

use super::body::build_body;
use super::entities::{ApiKeyKind, AuthSpec, HttpRequestNodeTimeout, RequestSpec};
use crate::config::HttpRequestConfig;
use crate::errors::HttpRequestError;
use crate::traits::FileResolver;
use crate::types::{OutboundRequest, RequestPayload, Timeouts};
use crate::variable_pool::VariablePool;

/// Parse newline-separated `key:value` lines.
///
/// Splits on the first colon; both sides are trimmed. Blank lines are
/// skipped and a line without a colon is a key with an empty value.
pub fn parse_key_values(text: &str) -> Vec<(String, String)> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once(':') {
            Some((k, v)) => (k.trim().to_string(), v.trim().to_string()),
            None => (line.to_string(), String::new()),
        })
        .filter(|(k, _)| !k.is_empty())
        .collect()
}

/// Set `name` to `value`, replacing any existing header of that name
/// regardless of case.
fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value));
}

fn auth_value(auth: &AuthSpec, pool: &VariablePool) -> String {
    let key = pool.render_template(&auth.api_key);
    match auth.kind {
        ApiKeyKind::Bearer => format!("Bearer {key}"),
        ApiKeyKind::Basic => {
            // A bare `user:pass` gets encoded; anything else is taken as
            // already encoded.
            let encoded = if key.contains(':') {
                base64::engine::general_purpose::STANDARD.encode(key.as_bytes())
            } else {
                key
            };
            format!("Basic {encoded}")
        }
        ApiKeyKind::Custom => key,
    }
}

fn clamp(requested: Option<u64>, max: Duration) -> Duration {
    match requested {
        Some(secs) if secs > 0 => Duration::from_secs(secs).min(max),
        _ => max,
    }
}

pub(crate) fn timeouts(requested: &HttpRequestNodeTimeout, config: &HttpRequestConfig) -> Timeouts {
    Timeouts {
        connect: clamp(requested.connect, config.max_connect_timeout()),
        read: clamp(requested.read, config.max_read_timeout()),
        write: clamp(requested.write, config.max_write_timeout()),
    }
}

fn render_url(spec: &RequestSpec, pool: &VariablePool) -> Result<String, HttpRequestError> {
    let url = pool.render_template(&spec.url).trim().to_string();
    let parsed = reqwest::Url::parse(&url).map_err(|e| HttpRequestError::InvalidRequest {
        message: format!("invalid URL {url:?}: {e}"),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(url),
        other => Err(HttpRequestError::InvalidRequest {
            message: format!("URL scheme must be http or https, got {other:?}"),
        }),
    }
}

/// Render everything the transport needs, fetching file content along the
/// way. Nothing is sent.
pub async fn build_request(
    spec: &RequestSpec,
    config: &HttpRequestConfig,
    pool: &VariablePool,
    resolver: &dyn FileResolver,
) -> Result<OutboundRequest, HttpRequestError> {
    let url = render_url(spec, pool)?;

    let mut headers = Vec::new();
    for (k, v) in parse_key_values(&pool.render_template(&spec.headers)) {
        set_header(&mut headers, &k, v);
    }
    let params = parse_key_values(&pool.render_template(&spec.params));

    if let Some(auth) = &spec.auth {
        set_header(&mut headers, &auth.header, auth_value(auth, pool));
    }

    let body = build_body(&spec.body, pool, resolver).await?;
    if matches!(body.payload, RequestPayload::Multipart { .. }) {
        // The transport sets the multipart type together with its boundary.
        headers.retain(|(k, _)| !k.eq_ignore_ascii_case("content-type"));
    }
    if let Some(content_type) = body.content_type {
        if !headers
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case("content-type"))
        {
            headers.push(("Content-Type".to_string(), content_type));
        }
    }

    Ok(OutboundRequest {
        method: spec.method,
        url,
        headers,
        params,
        payload: body.payload,
        timeouts: timeouts(&spec.timeout, config),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_ctx::FnFileResolver;
    use crate::nodes::http_request::entities::{BodySpec, FormField};
    use crate::types::{HttpMethod, Variable};
    use crate::variable_pool::SystemVariables;
    use std::collections::BTreeMap;

    fn pool() -> VariablePool {
        let pool = VariablePool::new(SystemVariables::empty(), BTreeMap::new());
        pool.add(&["start", "token"], Variable::new("token", "sk-1"))
            .unwrap();
        pool.add(&["start", "id"], Variable::new("id", "42")).unwrap();
        pool
    }

    fn spec() -> RequestSpec {
        RequestSpec {
            method: HttpMethod::Get,
            url: "http://example.org/items/{{#start.id#}}".into(),
            headers: String::new(),
            params: String::new(),
            auth: None,
            body: BodySpec::None,
            timeout: HttpRequestNodeTimeout::default(),
            fail_on_error_status: false,
        }
    }

    async fn build(spec: &RequestSpec) -> Result<OutboundRequest, HttpRequestError> {
        build_request(
            spec,
            &HttpRequestConfig::default(),
            &pool(),
            &FnFileResolver::constant(b""),
        )
        .await
    }

    #[test]
    fn key_value_lines() {
        let parsed = parse_key_values("a:1\n\n  b : x:y \nflag\n:orphan");
        assert_eq!(
            parsed,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "x:y".to_string()),
                ("flag".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn timeouts_clamp_to_config() {
        let config = HttpRequestConfig::default();
        let t = timeouts(
            &HttpRequestNodeTimeout {
                connect: Some(3),
                read: Some(600),
                write: Some(0),
            },
            &config,
        );
        assert_eq!(t.connect, Duration::from_secs(3));
        assert_eq!(t.read, config.max_read_timeout());
        assert_eq!(t.write, config.max_write_timeout());
    }

    #[tokio::test]
    async fn renders_url_headers_and_params() {
        let mut spec = spec();
        spec.headers = "X-Token: {{#start.token#}}\nx-token: override".into();
        spec.params = "q:{{#start.id#}}\nq:again".into();
        let req = build(&spec).await.unwrap();

        assert_eq!(req.url, "http://example.org/items/42");
        assert_eq!(req.headers, vec![("x-token".to_string(), "override".to_string())]);
        assert_eq!(
            req.params,
            vec![
                ("q".to_string(), "42".to_string()),
                ("q".to_string(), "again".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn rejects_bad_urls() {
        let mut spec = spec();
        spec.url = "ftp://example.org/x".into();
        assert!(matches!(
            build(&spec).await,
            Err(HttpRequestError::InvalidRequest { .. })
        ));
        spec.url = "{{#start.missing#}}".into();
        assert!(matches!(
            build(&spec).await,
            Err(HttpRequestError::InvalidRequest { .. })
        ));
    }

    #[tokio::test]
    async fn auth_headers() {
        let mut spec = spec();
        spec.auth = Some(AuthSpec {
            kind: ApiKeyKind::Bearer,
            api_key: "{{#start.token#}}".into(),
            header: "Authorization".into(),
        });
        spec.headers = "authorization: user-set".into();
        let req = build(&spec).await.unwrap();
        assert_eq!(req.header("Authorization"), Some("Bearer sk-1"));
        assert_eq!(req.headers.len(), 1);

        spec.auth = Some(AuthSpec {
            kind: ApiKeyKind::Basic,
            api_key: "user:pass".into(),
            header: "Authorization".into(),
        });
        let req = build(&spec).await.unwrap();
        assert_eq!(req.header("authorization"), Some("Basic dXNlcjpwYXNz"));

        spec.auth = Some(AuthSpec {
            kind: ApiKeyKind::Basic,
            api_key: "dXNlcjpwYXNz".into(),
            header: "Authorization".into(),
        });
        let req = build(&spec).await.unwrap();
        assert_eq!(req.header("authorization"), Some("Basic dXNlcjpwYXNz"));

        spec.auth = Some(AuthSpec {
            kind: ApiKeyKind::Custom,
            api_key: "raw".into(),
            header: "X-Api-Key".into(),
        });
        let req = build(&spec).await.unwrap();
        assert_eq!(req.header("x-api-key"), Some("raw"));
    }

    #[tokio::test]
    async fn content_type_defaults_without_overriding_user() {
        let mut spec = spec();
        spec.method = HttpMethod::Post;
        spec.body = BodySpec::Json {
            template: "{}".into(),
        };
        let req = build(&spec).await.unwrap();
        assert_eq!(req.header("content-type"), Some("application/json"));

        spec.headers = "Content-Type: application/vnd.api+json".into();
        let req = build(&spec).await.unwrap();
        assert_eq!(req.header("content-type"), Some("application/vnd.api+json"));
        assert_eq!(req.headers.len(), 1);
    }

    #[tokio::test]
    async fn multipart_drops_user_content_type() {
        let mut spec = spec();
        spec.method = HttpMethod::Post;
        spec.headers = "Content-Type: multipart/form-data\nX-Keep: 1".into();
        spec.body = BodySpec::FormData {
            fields: vec![FormField::Text {
                key: "name".into(),
                value: "test".into(),
            }],
        };
        let req = build(&spec).await.unwrap();
        assert_eq!(req.header("content-type"), None);
        assert_eq!(req.header("x-keep"), Some("1"));
    }
}
