//! Single-shot transport to the Composio action API.
//!
//! One POST per call, no retries. The reply is checked according to the
//! configured [`ResponseValidation`] before anything downstream sees it.
use super::request::SearchRequest;
use chatter_common::{
    ChatterError, ProviderApiVersion, ResponseValidation, Result, SearchCredentials,
};
use chatter_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde_json::Value;
use std::time::Duration;

pub const COMPOSIO_API_BASE: &str = "https://backend.composio.dev/api";
pub const API_KEY_HEADER: &str = "x-api-key";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct ComposioClient {
    http: HttpClient,
    api_version: ProviderApiVersion,
    validation: ResponseValidation,
}

impl ComposioClient {
    /// Client for `base_url` speaking `api_version`, with that version's
    /// default validation discipline and a 60 second timeout.
    pub fn new(base_url: &str, api_version: ProviderApiVersion) -> Result<Self> {
        let http = HttpClient::new(base_url)
            .map_err(http_to_chatter)?
            .with_timeout(REQUEST_TIMEOUT);
        Ok(Self {
            http,
            api_version,
            validation: api_version.default_validation(),
        })
    }

    pub fn with_validation(mut self, validation: ResponseValidation) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    pub fn api_version(&self) -> ProviderApiVersion {
        self.api_version
    }

    pub fn validation(&self) -> ResponseValidation {
        self.validation
    }

    /// Execute the search action and return the reply's `data` payload
    /// (or the whole body when it has none).
    pub async fn execute(
        &self,
        request: &SearchRequest,
        credentials: &SearchCredentials,
        connection_id: Option<&str>,
    ) -> Result<Value> {
        let body = request.body(self.api_version, credentials, connection_id);
        let path = request.path();
        let opts = RequestOpts {
            auth: Some(Auth::Header {
                name: API_KEY_HEADER,
                secret: credentials.api_key(),
            }),
            ..Default::default()
        };

        let reply: Value = match self.validation {
            ResponseValidation::Strict => self
                .http
                .post_json_opts(&path, &body, opts)
                .await
                .map_err(http_to_chatter)?,
            ResponseValidation::Lenient => {
                let raw = self
                    .http
                    .post_json_raw(&path, &body, opts)
                    .await
                    .map_err(http_to_chatter)?;
                if !raw.is_success() {
                    tracing::debug!(
                        status = %raw.status,
                        action = request.action(),
                        "composio.lenient.non_success_status"
                    );
                }
                let status = raw.status;
                raw.json().map_err(|e| match e {
                    HttpError::Decode(message, snippet) if !status.is_success() => {
                        ChatterError::Malformed(format!(
                            "HTTP {}: {message}; body: {snippet}",
                            status.as_u16()
                        ))
                    }
                    other => http_to_chatter(other),
                })?
            }
        };

        unwrap_envelope(reply)
    }
}

/// Fail on `success` falsy with a populated `error`; otherwise take `data`.
pub(crate) fn unwrap_envelope(reply: Value) -> Result<Value> {
    let mut obj = match reply {
        Value::Object(obj) => obj,
        other => return Ok(other),
    };

    let succeeded = obj.get("success").is_some_and(truthy);
    if !succeeded {
        if let Some(error) = obj.get("error").filter(|e| truthy(e)) {
            let message = match error {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            tracing::warn!(error = %message, "composio.provider_error");
            return Err(ChatterError::Provider(message));
        }
    }

    Ok(match obj.remove("data") {
        Some(data) => data,
        None => Value::Object(obj),
    })
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn http_to_chatter(e: HttpError) -> ChatterError {
    match e {
        HttpError::Api {
            status,
            body_snippet,
            ..
        } => ChatterError::Http {
            status: status.as_u16(),
            body: body_snippet,
        },
        HttpError::Network(message) => ChatterError::Network(message),
        HttpError::Decode(message, snippet) => {
            ChatterError::Malformed(format!("{message}; body: {snippet}"))
        }
        HttpError::Url(message) | HttpError::Build(message) => ChatterError::Config(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatter_common::ErrorKind;
    use serde_json::json;

    #[test]
    fn provider_error_surfaces_verbatim() {
        let err = unwrap_envelope(json!({ "success": false, "error": "bad query" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Provider);
        assert!(err.to_string().contains("bad query"));
    }

    #[test]
    fn missing_success_counts_as_failure() {
        let err = unwrap_envelope(json!({ "error": "quota exceeded" })).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Provider);
    }

    #[test]
    fn empty_error_is_not_a_failure() {
        let data = unwrap_envelope(json!({ "success": false, "error": "", "data": [1] })).unwrap();
        assert_eq!(data, json!([1]));
    }

    #[test]
    fn success_with_error_text_is_not_a_failure() {
        let data =
            unwrap_envelope(json!({ "success": true, "error": "warning", "data": { "x": 1 } }))
                .unwrap();
        assert_eq!(data, json!({ "x": 1 }));
    }

    #[test]
    fn body_without_data_is_returned_whole() {
        let data = unwrap_envelope(json!({ "successful": true, "items": [] })).unwrap();
        assert_eq!(data, json!({ "successful": true, "items": [] }));
    }

    #[test]
    fn list_body_passes_through() {
        assert_eq!(unwrap_envelope(json!([1, 2])).unwrap(), json!([1, 2]));
    }

    #[test]
    fn structured_error_is_stringified() {
        let err =
            unwrap_envelope(json!({ "success": false, "error": { "code": 7 } })).unwrap_err();
        assert!(err.to_string().contains("\"code\":7"));
    }

    #[test]
    fn validation_follows_version_by_default() {
        let legacy = ComposioClient::new(COMPOSIO_API_BASE, ProviderApiVersion::Legacy).unwrap();
        assert_eq!(legacy.validation(), ResponseValidation::Strict);
        let entity = ComposioClient::new(COMPOSIO_API_BASE, ProviderApiVersion::Entity)
            .unwrap()
            .with_validation(ResponseValidation::Strict);
        assert_eq!(entity.validation(), ResponseValidation::Strict);
    }
}
