//! Common types shared across the Chatter crates.
//!
//! This crate holds the small domain vocabulary every other crate agrees on:
//! which platform is searched, which Composio API contract is spoken, how
//! responses are validated, the credentials a search runs with, and the error
//! taxonomy surfaced to callers. Observability setup lives in
//! [`observability`].
//!
//! # Examples
//!
//! ```rust
//! use chatter_common::{Platform, ProviderApiVersion, ResponseValidation};
//!
//! assert_eq!(Platform::Twitter.clamp_result_count(3), 10);
//! assert_eq!(Platform::Reddit.clamp_result_count(3), 3);
//! assert_eq!(
//!     ProviderApiVersion::Entity.default_validation(),
//!     ResponseValidation::Lenient
//! );
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod observability;

/// Placeholder account id used when `COMPOSIO_USER_ID` is not configured.
pub const PLACEHOLDER_ACCOUNT_ID: &str = "pg-test-YOUR-USER-ID";

/// Smallest `max_results` the Twitter recent-search action accepts.
pub const TWITTER_MIN_RESULTS: u32 = 10;

/// Social platform reachable through Composio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Reddit,
    Twitter,
}

impl Platform {
    /// Apply the platform's floor on the requested result count.
    ///
    /// Twitter never goes below [`TWITTER_MIN_RESULTS`]; Reddit passes through.
    pub fn clamp_result_count(self, requested: u32) -> u32 {
        match self {
            Platform::Reddit => requested,
            Platform::Twitter => requested.max(TWITTER_MIN_RESULTS),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Reddit => "reddit",
            Platform::Twitter => "twitter",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Historical versions of the Composio action contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderApiVersion {
    /// `{ userId, input, connectedAccountId? }`
    #[default]
    Legacy,
    /// `{ appName, entityId, input }`
    Entity,
}

impl ProviderApiVersion {
    /// Validation discipline historically paired with this contract.
    pub fn default_validation(self) -> ResponseValidation {
        match self {
            ProviderApiVersion::Legacy => ResponseValidation::Strict,
            ProviderApiVersion::Entity => ResponseValidation::Lenient,
        }
    }
}

/// How a Composio reply is judged before it is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseValidation {
    /// Non-2xx status is fatal, then the `success`/`error` envelope is checked.
    Strict,
    /// Only the `success`/`error` envelope is checked.
    Lenient,
}

/// Credentials a search runs with. Built once and never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct SearchCredentials {
    api_key: String,
    account_id: String,
}

impl SearchCredentials {
    /// Build credentials from explicit values.
    ///
    /// An empty `api_key` is rejected; an empty `account_id` falls back to
    /// [`PLACEHOLDER_ACCOUNT_ID`].
    ///
    /// ```
    /// use chatter_common::{SearchCredentials, PLACEHOLDER_ACCOUNT_ID};
    ///
    /// let creds = SearchCredentials::new("key", "").unwrap();
    /// assert_eq!(creds.account_id(), PLACEHOLDER_ACCOUNT_ID);
    /// assert!(SearchCredentials::new("", "user").is_err());
    /// ```
    pub fn new(api_key: impl Into<String>, account_id: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(ChatterError::Config("Composio API key is empty".into()));
        }
        let mut account_id = account_id.into();
        if account_id.is_empty() {
            account_id = PLACEHOLDER_ACCOUNT_ID.to_string();
        }
        Ok(Self {
            api_key,
            account_id,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }
}

impl fmt::Debug for SearchCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchCredentials")
            .field("api_key", &"<redacted>")
            .field("account_id", &self.account_id)
            .finish()
    }
}

/// Coarse classification of a [`ChatterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Transport,
    Provider,
    Malformed,
}

/// Error types surfaced by a search call.
#[derive(thiserror::Error, Debug)]
pub enum ChatterError {
    /// A required credential is absent from the environment.
    #[error("{variable} not set. Set {variable} in your shell or {location}")]
    MissingCredential {
        variable: &'static str,
        location: &'static str,
    },

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Composio answered with a non-success HTTP status.
    #[error("Composio {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response (timeout, DNS, refused, ...).
    #[error("Composio transport error: {0}")]
    Network(String),

    /// Composio reported `success: false` with an error message.
    #[error("Composio error: {0}")]
    Provider(String),

    /// The reply could not be read as the expected structure.
    #[error("Malformed Composio response: {0}")]
    Malformed(String),
}

impl ChatterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatterError::MissingCredential { .. } | ChatterError::Config(_) => {
                ErrorKind::Configuration
            }
            ChatterError::Http { .. } | ChatterError::Network(_) => ErrorKind::Transport,
            ChatterError::Provider(_) => ErrorKind::Provider,
            ChatterError::Malformed(_) => ErrorKind::Malformed,
        }
    }
}

/// Convenient alias for results that use [`ChatterError`].
pub type Result<T> = std::result::Result<T, ChatterError>;
