//! Minimal JSON-over-HTTP client with safe logging and header auth.
//!
//! - Request options: extra headers, [`Auth`], per-request timeout
//! - One attempt per call; callers decide what a failure means
//! - Secret headers are never logged (`authorization`, `x-api-key`)
//! - Optional *raw* request/response logging via `CHATTER_HTTP_RAW=1`
//!
//! Example (no_run):
//! ```no_run
//! # async fn demo() -> Result<(), chatter_http::HttpError> {
//! let client = chatter_http::HttpClient::new("https://api.example.com/api")?;
//! let body = serde_json::json!({ "q": "rust" });
//! let got: serde_json::Value = client
//!     .post_json_opts("v1/search", &body, chatter_http::RequestOpts::default())
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Observability: `tracing` events are emitted for request start, response
//! headers, truncated body snippets and final errors, plus curl-style raw lines
//! (target `http.raw`) when `CHATTER_HTTP_RAW=1`.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;

// ==============================
// Raw logging toggles
// ==============================

const RAW_ENV: &str = "CHATTER_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;

/// Upper bound, in characters, of body text carried by errors and logs.
pub const BODY_SNIPPET_CHARS: usize = 500;

const SECRET_HEADERS: &[&str] = &["authorization", "x-api-key", "proxy-authorization"];

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn is_secret_header(name: &str) -> bool {
    SECRET_HEADERS
        .iter()
        .any(|secret| name.eq_ignore_ascii_case(secret))
}

/// Render a best-effort curl command for repro/debug, with secrets redacted.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap, body: Option<&[u8]>) -> String {
    let mut parts = vec!["curl".to_string(), format!("-X{method}")];
    for (name, val) in redact_headers(headers) {
        parts.push(format!("-H '{}: {}'", name, val.replace('\'', r"'\''")));
    }
    if let Some(bytes) = body {
        match std::str::from_utf8(bytes) {
            Ok(s) => {
                let s = truncate_chars(s, RAW_MAX_BODY);
                parts.push(format!("-d '{}'", s.replace('\'', r"'\''")));
            }
            Err(_) => parts.push(format!("--data-binary @- # ({} bytes)", bytes.len())),
        }
    }
    parts.push(format!("'{}'", url.as_str()));
    parts.join(" ")
}

/// Redact sensitive headers for logging
fn redact_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let key = k.as_str().to_string();
            let val = if is_secret_header(&key) {
                "<redacted>".to_string()
            } else {
                v.to_str().unwrap_or("").to_string()
            };
            (key, val)
        })
        .collect()
}

// ==============================
// Errors
// ==============================

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {body_snippet}, request_id={request_id}")]
    Api {
        status: StatusCode,
        body_snippet: String,
        request_id: String,
    },
}

// ==============================
// Auth & Request Options
// ==============================

/// Authentication strategies supported by the client.
///
/// ```
/// use chatter_http::Auth;
///
/// let auth = Auth::Header { name: "x-api-key", secret: "token" };
/// match auth {
///     Auth::Header { name, .. } => assert_eq!(name, "x-api-key"),
///     Auth::None => unreachable!(),
/// }
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Secret carried in a named header (e.g. Composio `x-api-key`).
    Header { name: &'static str, secret: &'a str },
    None,
}

impl Auth<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Auth::Header { .. } => "header",
            Auth::None => "none",
        }
    }
}

/// Per-request tuning knobs.
///
/// ```
/// use chatter_http::{Auth, RequestOpts};
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(30)),
///     auth: Some(Auth::Header { name: "x-api-key", secret: "demo" }),
///     ..Default::default()
/// };
///
/// assert_eq!(opts.timeout.unwrap().as_secs(), 30);
/// assert!(opts.headers.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub auth: Option<Auth<'a>>,
    pub headers: Option<HeaderMap>,
}

/// A fully read response, whatever its status.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub request_id: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_slice::<T>(&self.body).map_err(|e| {
            tracing::warn!(
                request_id=%self.request_id,
                serde_line=%e.line(),
                serde_col=%e.column(),
                serde_err=%e,
                "http.response.decode_error"
            );
            HttpError::Decode(e.to_string(), self.snippet())
        })
    }

    /// Body text capped at [`BODY_SNIPPET_CHARS`] characters.
    pub fn snippet(&self) -> String {
        snip_body(&self.body)
    }
}

// ==============================
// Client
// ==============================

static REQUEST_SEQ: AtomicU64 = AtomicU64::new(1);

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    pub default_timeout: Duration,
}

impl HttpClient {
    /// Construct a client anchored to a base URL.
    ///
    /// The base is treated as a directory, so relative paths are appended to
    /// it rather than replacing its last segment.
    ///
    /// ```no_run
    /// use chatter_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://backend.composio.dev/api")?;
    /// assert_eq!(client.base().as_str(), "https://backend.composio.dev/api/");
    /// assert_eq!(client.default_timeout, Duration::from_secs(60));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{base}/")
        };
        let base = Url::parse(&base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: Duration::from_secs(60),
        })
    }

    /// Override the default timeout returned by [`HttpClient::new`].
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// POST JSON and decode a JSON reply; any non-2xx status is an error.
    pub async fn post_json_opts<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.send(Method::POST, path, Some(body), opts).await?;
        if !resp.is_success() {
            tracing::warn!(
                request_id=%resp.request_id,
                status=%resp.status,
                body_snippet=%resp.snippet(),
                "http.error"
            );
            return Err(HttpError::Api {
                status: resp.status,
                body_snippet: resp.snippet(),
                request_id: resp.request_id,
            });
        }
        resp.json()
    }

    /// POST JSON and hand back the response without judging its status.
    pub async fn post_json_raw<B>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<RawResponse, HttpError>
    where
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, Some(body), opts).await
    }

    fn resolve(&self, path: &str) -> Result<Url, HttpError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| HttpError::Url(e.to_string()))
    }

    // ==============================
    // Core request implementation
    // ==============================

    async fn send<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        opts: RequestOpts<'_>,
    ) -> Result<RawResponse, HttpError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.resolve(path)?;
        let timeout = opts.timeout.unwrap_or(self.default_timeout);

        let mut headers = opts.headers.unwrap_or_default();
        let body_bytes = match body {
            Some(b) => {
                let bytes =
                    serde_json::to_vec(b).map_err(|e| HttpError::Build(e.to_string()))?;
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                Some(bytes)
            }
            None => None,
        };

        let auth = opts.auth.unwrap_or(Auth::None);
        if let Auth::Header { name, secret } = &auth {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| HttpError::Build(format!("invalid auth header name {name:?}: {e}")))?;
            headers.insert(name, sanitize_secret(secret)?);
        }

        let req_id = format!("r{:06}", REQUEST_SEQ.fetch_add(1, Ordering::Relaxed));

        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            timeout_ms=timeout.as_millis() as u64,
            auth_kind=auth.kind(),
            has_body=%body_bytes.is_some(),
            "http.request.start"
        );

        if raw_enabled() {
            let curl = make_curl(&method, &url, &headers, body_bytes.as_deref());
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        let mut rb = self
            .inner
            .request(method, url)
            .timeout(timeout)
            .headers(headers);
        if let Some(bytes) = body_bytes {
            rb = rb.body(bytes);
        }

        let t0 = Instant::now();
        let resp = rb.send().await.map_err(|err| {
            tracing::warn!(req_id=%req_id, message=%err, "http.network_error.send");
            HttpError::Network(err.to_string())
        })?;
        let status = resp.status();
        let resp_headers = resp.headers().clone();
        let bytes = resp.bytes().await.map_err(|err| {
            tracing::warn!(req_id=%req_id, message=%err, "http.network_error.body");
            HttpError::Network(err.to_string())
        })?;
        let dur_ms = t0.elapsed().as_millis() as u64;

        let upstream_id = resp_headers
            .get("x-request-id")
            .or_else(|| resp_headers.get("x-correlation-id"))
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::debug!(
            req_id=%req_id,
            %status,
            duration_ms=dur_ms,
            body_len=bytes.len(),
            x_request_id=%upstream_id,
            "http.response.headers"
        );

        if raw_enabled() {
            let hdrs = redact_headers(&resp_headers);
            let text = String::from_utf8_lossy(&bytes);
            let truncated = text.chars().count() > RAW_MAX_BODY;
            tracing::info!(
                target: "http.raw",
                %req_id,
                status=%status,
                duration_ms=dur_ms,
                headers=?hdrs,
                body=%truncate_chars(&text, RAW_MAX_BODY),
                truncated
            );
        }

        let body = bytes.to_vec();
        tracing::trace!(
            req_id=%req_id,
            body_snippet=%snip_body(&body),
            "http.response.body_snippet"
        );

        Ok(RawResponse {
            status,
            body,
            request_id: if upstream_id == "-" {
                req_id
            } else {
                upstream_id.to_string()
            },
        })
    }
}

// ==============================
// Helpers
// ==============================

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Lossy UTF-8 view of `body`, capped at [`BODY_SNIPPET_CHARS`] characters.
pub fn snip_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    truncate_chars(&text, BODY_SNIPPET_CHARS).to_string()
}

fn sanitize_secret(raw: &str) -> Result<HeaderValue, HttpError> {
    let mut s = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string();
    s.retain(|ch| !ch.is_ascii_whitespace());

    if s.is_empty() {
        return Err(HttpError::Build("API key is empty".into()));
    }
    if !s.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if s.bytes().any(|b| b < 0x20 || b == 0x7F) {
        return Err(HttpError::Build(
            "API key contains control characters".into(),
        ));
    }

    let mut value = HeaderValue::from_str(&s)
        .map_err(|e| HttpError::Build(format!("invalid API key header: {e}")))?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_gains_trailing_slash() {
        let client = HttpClient::new("https://backend.composio.dev/api").unwrap();
        let url = client
            .resolve("/v2/actions/REDDIT_REDDIT_SEARCH/execute")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://backend.composio.dev/api/v2/actions/REDDIT_REDDIT_SEARCH/execute"
        );
    }

    #[test]
    fn snippet_counts_characters_not_bytes() {
        let body = "é".repeat(800);
        let snip = snip_body(body.as_bytes());
        assert_eq!(snip.chars().count(), BODY_SNIPPET_CHARS);
    }

    #[test]
    fn short_body_is_untouched() {
        assert_eq!(snip_body(b"oops"), "oops");
    }

    #[test]
    fn api_key_header_is_redacted() {
        let mut h = HeaderMap::new();
        h.insert("x-api-key", HeaderValue::from_static("abc"));
        h.insert("content-type", HeaderValue::from_static("application/json"));
        let redacted = redact_headers(&h);
        assert!(redacted.contains(&("x-api-key".into(), "<redacted>".into())));
        assert!(redacted.contains(&("content-type".into(), "application/json".into())));
    }

    #[test]
    fn curl_never_contains_secret() {
        let mut h = HeaderMap::new();
        h.insert("x-api-key", HeaderValue::from_static("topsecret"));
        let url = Url::parse("https://example.com/api/x").unwrap();
        let curl = make_curl(&Method::POST, &url, &h, Some(br#"{"a":1}"#));
        assert!(!curl.contains("topsecret"));
        assert!(curl.contains(r#"-d '{"a":1}'"#));
    }

    #[test]
    fn secret_is_trimmed_and_validated() {
        let v = sanitize_secret(" \"key-123\"\n").unwrap();
        assert_eq!(v.to_str().unwrap(), "key-123");
        assert!(sanitize_secret("   ").is_err());
        assert!(sanitize_secret("kéy").is_err());
    }
}
