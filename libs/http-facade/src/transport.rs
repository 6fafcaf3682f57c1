use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http::Method;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::body::{BodyMode, encode_query, kind};
use crate::config::Config;
use crate::error::{ClientError, RequestError};
use crate::response::normalize_body;

/// Option keys understood by the transport
pub const OPTION_HEADERS: &str = "headers";
pub const OPTION_QUERY: &str = "query";
pub const OPTION_BODY: &str = "body";
pub const OPTION_HTTP_ERRORS: &str = "http_errors";

/// Thin wrapper over a `reqwest::Client` bound to an optional base URL
#[derive(Debug)]
pub(crate) struct Transport {
    http_client: reqwest::Client,
    base_url: Option<Url>,
}

impl Transport {
    pub(crate) fn new(config: &Config) -> Result<Self, ClientError> {
        // Idle connections are dropped so that blocking calls, which may each
        // run on a short-lived runtime, never pick up a dead socket.
        let mut builder = reqwest::Client::builder().pool_max_idle_per_host(0);
        if config.timeout_secs() > 0 {
            builder = builder.timeout(config.timeout());
        }
        let http_client = builder
            .build()
            .map_err(|e| ClientError::BuildError(e.to_string()))?;

        let base_url = config
            .base_uri()
            .map(Url::parse)
            .transpose()
            .map_err(|e| ClientError::BuildError(format!("Invalid base URI: {e}")))?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Perform one HTTP exchange and normalize the response body
    pub(crate) async fn send(
        &self,
        method: &str,
        path: &str,
        options: Map<String, Value>,
    ) -> Result<Map<String, Value>, ClientError> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|e| ClientError::BuildError(format!("Invalid method {method:?}: {e}")))?;
        let mut url = self.resolve(path)?;
        let prepared = PreparedOptions::from_options(options)?;

        if let Some(query) = prepared.query.as_deref() {
            url.set_query(Some(query));
        }

        debug!(%method, %url, "dispatching request");

        let mut req_builder = self
            .http_client
            .request(method, url)
            .headers(prepared.headers);
        if let Some(body) = prepared.body {
            req_builder = req_builder.body(body);
        }

        let resp = req_builder
            .send()
            .await
            .map_err(RequestError::without_response)?;

        let status = resp.status();
        debug!(status = status.as_u16(), "response received");

        let failure = if prepared.http_errors {
            resp.error_for_status_ref().err()
        } else {
            None
        };

        let contents = resp.bytes().await.map_err(|e| {
            RequestError::new(e.to_string(), status.as_u16(), Map::new(), Some(e))
        })?;
        let body = normalize_body(&contents);

        match failure {
            Some(err) => {
                Err(RequestError::new(err.to_string(), status.as_u16(), body, Some(err)).into())
            }
            None => Ok(body),
        }
    }

    fn resolve(&self, path: &str) -> Result<Url, ClientError> {
        match &self.base_url {
            Some(base) => base.join(path),
            None => Url::parse(path),
        }
        .map_err(|e| ClientError::BuildError(format!("Invalid request URL {path:?}: {e}")))
    }
}

/// Request options translated into transport terms
#[derive(Debug)]
struct PreparedOptions {
    headers: HeaderMap,
    body: Option<Bytes>,
    content_type: Option<&'static str>,
    query: Option<String>,
    http_errors: bool,
}

impl PreparedOptions {
    fn from_options(options: Map<String, Value>) -> Result<Self, ClientError> {
        let mut prepared = Self {
            headers: HeaderMap::new(),
            body: None,
            content_type: None,
            query: None,
            http_errors: true,
        };

        let mut raw = None;
        for (key, value) in options {
            if let Some(mode) = BodyMode::from_option_key(&key) {
                if is_empty_params(&value) {
                    continue;
                }
                prepared.body = Some(mode.encode(&value)?);
                prepared.content_type = Some(mode.content_type());
                continue;
            }

            match key.as_str() {
                OPTION_HEADERS => prepared.headers = header_map(value)?,
                OPTION_QUERY => prepared.query = query_string(&value)?,
                OPTION_BODY => raw = Some(raw_body(value)?),
                OPTION_HTTP_ERRORS => {
                    prepared.http_errors = value.as_bool().ok_or_else(|| {
                        ClientError::BuildError(format!(
                            "http_errors must be a bool, got {}",
                            kind(&value)
                        ))
                    })?;
                }
                _ => debug!(option = %key, "ignoring unsupported request option"),
            }
        }

        // An explicit raw body replaces the encoded parameters
        if let Some(raw) = raw {
            prepared.body = Some(raw);
            prepared.content_type = None;
        }

        if let Some(content_type) = prepared.content_type
            && !prepared.headers.contains_key(CONTENT_TYPE)
        {
            prepared
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }

        Ok(prepared)
    }
}

/// No parameters means no body, so a bare `GET` carries no payload
fn is_empty_params(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

fn header_map(value: Value) -> Result<HeaderMap, ClientError> {
    let Value::Object(fields) = value else {
        return Err(ClientError::BuildError(format!(
            "headers must be a map, got {}",
            kind(&value)
        )));
    };

    let mut headers = HeaderMap::new();
    for (name, value) in fields {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ClientError::BuildError(format!("Invalid header name {name:?}: {e}")))?;

        let values = match value {
            Value::Array(items) => items,
            single => vec![single],
        };
        for item in values {
            let Some(text) = header_text(&item) else {
                debug!(header = %name, "skipping header without a value");
                continue;
            };
            let header_value = HeaderValue::from_str(&text).map_err(|e| {
                ClientError::BuildError(format!("Invalid header value for {name}: {e}"))
            })?;
            headers.append(header_name.clone(), header_value);
        }
    }
    Ok(headers)
}

fn header_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn query_string(value: &Value) -> Result<Option<String>, ClientError> {
    let query = match value {
        Value::Object(fields) => encode_query(fields)?,
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => {
            return Err(ClientError::BuildError(format!(
                "query must be a map or a string, got {}",
                kind(other)
            )));
        }
    };
    Ok((!query.is_empty()).then_some(query))
}

fn raw_body(value: Value) -> Result<Bytes, ClientError> {
    match value {
        Value::String(text) => Ok(Bytes::from(text)),
        Value::Null => Ok(Bytes::new()),
        other => Err(ClientError::BuildError(format!(
            "body must be a string, got {}",
            kind(&other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_prepare_json_body() {
        let prepared = PreparedOptions::from_options(options(json!({
            "json": {"x": 1},
            "headers": {"X-Package-Name": "sdk", "X-Package-Version": 1}
        })))
        .unwrap();

        assert_eq!(prepared.body, Some(Bytes::from_static(br#"{"x":1}"#)));
        assert_eq!(prepared.headers[CONTENT_TYPE], "application/json");
        assert_eq!(prepared.headers["x-package-name"], "sdk");
        assert_eq!(prepared.headers["x-package-version"], "1");
        assert!(prepared.http_errors);
        assert_eq!(prepared.query, None);
    }

    #[test]
    fn test_prepare_keeps_explicit_content_type() {
        let prepared = PreparedOptions::from_options(options(json!({
            "form_params": {"a": "b"},
            "headers": {"Content-Type": "application/vnd.custom+form"}
        })))
        .unwrap();

        assert_eq!(prepared.body, Some(Bytes::from_static(b"a=b")));
        assert_eq!(prepared.headers[CONTENT_TYPE], "application/vnd.custom+form");
    }

    #[test]
    fn test_prepare_skips_null_headers() {
        let prepared = PreparedOptions::from_options(options(json!({
            "headers": {"X-Package-Name": null, "Accept": ["text/plain", "application/json"]}
        })))
        .unwrap();

        assert!(!prepared.headers.contains_key("x-package-name"));
        let accept: Vec<_> = prepared.headers.get_all("accept").iter().collect();
        assert_eq!(accept, ["text/plain", "application/json"]);
    }

    #[test]
    fn test_prepare_query_and_flags() {
        let prepared = PreparedOptions::from_options(options(json!({
            "query": {"page": 2},
            "http_errors": false,
            "allow_redirects": false
        })))
        .unwrap();

        assert_eq!(prepared.query.as_deref(), Some("page=2"));
        assert!(!prepared.http_errors);
        assert!(prepared.body.is_none());
    }

    #[test]
    fn test_prepare_raw_body_wins_over_params() {
        let prepared = PreparedOptions::from_options(options(json!({
            "json": {"x": 1},
            "body": "raw payload",
            "headers": {}
        })))
        .unwrap();

        assert_eq!(prepared.body, Some(Bytes::from_static(b"raw payload")));
        assert!(!prepared.headers.contains_key(CONTENT_TYPE));
    }

    #[test]
    fn test_prepare_empty_params_send_no_body() {
        for key in ["json", "form_params"] {
            let mut fields = Map::new();
            fields.insert(key.to_owned(), json!({}));
            fields.insert("headers".to_owned(), json!({"Accept": "*/*"}));
            let prepared = PreparedOptions::from_options(fields).unwrap();

            assert!(prepared.body.is_none(), "{key}");
            assert!(!prepared.headers.contains_key(CONTENT_TYPE), "{key}");
        }
    }

    #[test]
    fn test_prepare_rejects_bad_options() {
        let err = PreparedOptions::from_options(options(json!({"headers": "nope"}))).unwrap_err();
        assert!(matches!(err, ClientError::BuildError(_)));

        let err = PreparedOptions::from_options(options(json!({"headers": {"bad header": "v"}})))
            .unwrap_err();
        assert!(matches!(err, ClientError::BuildError(_)));

        let err = PreparedOptions::from_options(options(json!({"http_errors": "yes"}))).unwrap_err();
        assert!(matches!(err, ClientError::BuildError(_)));
    }

    #[test]
    fn test_resolve_against_base() {
        let mut config = Config::default();
        config.set_base_uri("http://api.test/base/");
        let transport = Transport::new(&config).unwrap();

        assert_eq!(transport.resolve("users").unwrap().as_str(), "http://api.test/base/users");
        assert_eq!(transport.resolve("/users").unwrap().as_str(), "http://api.test/users");
        assert_eq!(transport.resolve("/").unwrap().as_str(), "http://api.test/");
    }

    #[test]
    fn test_resolve_without_base() {
        let transport = Transport::new(&Config::default()).unwrap();

        assert_eq!(
            transport.resolve("http://other.test/x").unwrap().as_str(),
            "http://other.test/x"
        );
        assert!(matches!(
            transport.resolve("/relative"),
            Err(ClientError::BuildError(_))
        ));
    }

    #[test]
    fn test_invalid_base_uri() {
        let mut config = Config::default();
        config.set_base_uri("not a url");
        assert!(matches!(
            Transport::new(&config),
            Err(ClientError::BuildError(_))
        ));
    }
}
