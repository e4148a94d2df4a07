//! Loader for Chatter configuration with YAML + environment overlays.
//!
//! Sources are merged in this order (later wins): YAML files and inline
//! snippets, then `CHATTER__`-prefixed environment variables such as
//! `CHATTER__COMPOSIO__API_VERSION=entity`. `${VAR}` placeholders in string
//! values are expanded afterwards. Anything the config leaves unset falls back
//! to the `COMPOSIO_*` variables read by [`credentials`].
use chatter_common::observability::LogFormat;
use chatter_common::{
    Platform, ProviderApiVersion, ResponseValidation, Result as ChatterResult, SearchCredentials,
};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod credentials;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "CHATTER";

pub const DEFAULT_BASE_URL: &str = "https://backend.composio.dev/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Default, Deserialize)]
pub struct ChatterConfig {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub composio: ComposioSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl ChatterConfig {
    /// Emit the effective provider settings. Call once a subscriber is installed.
    pub fn log_summary(&self) {
        tracing::debug!(
            api_version = ?self.composio.api_version,
            validation = ?self.composio.validation(),
            base_url = %self.composio.base_url,
            timeout_secs = self.composio.timeout().as_secs(),
            "config.loaded"
        );
    }
}

/// The `composio:` block.
#[derive(Debug, Deserialize)]
pub struct ComposioSection {
    #[serde(default, deserialize_with = "lenient_string")]
    pub api_key: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub api_version: ProviderApiVersion,
    /// Overrides the discipline implied by `api_version`.
    #[serde(default)]
    pub validation: Option<ResponseValidation>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default, deserialize_with = "lenient_string")]
    pub reddit_connection_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub twitter_connection_id: Option<String>,
}

impl Default for ComposioSection {
    fn default() -> Self {
        Self {
            api_key: None,
            user_id: None,
            api_version: ProviderApiVersion::default(),
            validation: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            reddit_connection_id: None,
            twitter_connection_id: None,
        }
    }
}

impl ComposioSection {
    /// Credentials from this section, falling back to the environment.
    pub fn credentials(&self) -> ChatterResult<SearchCredentials> {
        let api_key = match non_empty(&self.api_key) {
            Some(key) => key.to_string(),
            None => credentials::resolve_api_key()?,
        };
        let account_id = match non_empty(&self.user_id) {
            Some(id) => id.to_string(),
            None => credentials::resolve_account_id(),
        };
        SearchCredentials::new(api_key, account_id)
    }

    /// Legacy connected-account id for `platform`, falling back to the environment.
    pub fn connection_id(&self, platform: Platform) -> Option<String> {
        let configured = match platform {
            Platform::Reddit => &self.reddit_connection_id,
            Platform::Twitter => &self.twitter_connection_id,
        };
        non_empty(configured)
            .map(str::to_string)
            .or_else(|| credentials::resolve_connection_id(platform))
    }

    pub fn validation(&self) -> ResponseValidation {
        self.validation
            .unwrap_or_else(|| self.api_version.default_validation())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// The `logging:` block.
#[derive(Debug, Default, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub format: LogFormat,
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[serde(default)]
    pub filter: Option<String>,
    /// Directory for the rolling log file; no file sink when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

/// Environment overrides are parsed eagerly, so an all-digit id arrives as a number.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// `$XDG_CONFIG_HOME/chatter/chatter.yaml` (or the platform equivalent).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("chatter").join("chatter.yaml"))
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct ChatterConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for ChatterConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatterConfigLoader {
    /// Start empty; `CHATTER__` env overrides are applied by [`Self::load`].
    ///
    /// ```
    /// use chatter_config::ChatterConfigLoader;
    ///
    /// let config = ChatterConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.composio.timeout_secs, 60);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a required YAML/TOML/JSON file; the format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that may not exist.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use chatter_common::{ProviderApiVersion, ResponseValidation};
    /// use chatter_config::ChatterConfigLoader;
    ///
    /// let cfg = ChatterConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// composio:
    ///   api_version: entity
    ///   timeout_secs: 5
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.composio.api_version, ProviderApiVersion::Entity);
    /// assert_eq!(cfg.composio.validation(), ResponseValidation::Lenient);
    /// assert_eq!(cfg.composio.timeout().as_secs(), 5);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders, and deserialize.
    pub fn load(self) -> Result<ChatterConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}
