use chatter_common::observability::LogFormat;
use chatter_common::{Platform, ProviderApiVersion, ResponseValidation};
use chatter_config::ChatterConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

#[test]
#[serial]
fn loads_file_with_env_placeholders() {
    let tmp = TempDir::new().unwrap();
    let file_yaml = r#"
version: "0.1"
composio:
  api_key: "${CHATTER_TEST_COMPOSIO_KEY}"
  user_id: "pg-test-user"
  api_version: legacy
  reddit_connection_id: "conn-reddit"
logging:
  format: json
  filter: "chatter_social=debug"
"#;
    let p = write_yaml(&tmp, "chatter.yaml", file_yaml);

    temp_env::with_var("CHATTER_TEST_COMPOSIO_KEY", Some("ck_from_env"), || {
        let config = ChatterConfigLoader::new()
            .with_file(&p)
            .load()
            .expect("load config");

        assert_eq!(config.composio.api_key.as_deref(), Some("ck_from_env"));
        assert_eq!(config.composio.api_version, ProviderApiVersion::Legacy);
        assert_eq!(config.composio.validation(), ResponseValidation::Strict);
        assert_eq!(
            config.composio.connection_id(Platform::Reddit).as_deref(),
            Some("conn-reddit")
        );
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(
            config.logging.filter.as_deref(),
            Some("chatter_social=debug")
        );

        let creds = config.composio.credentials().unwrap();
        assert_eq!(creds.api_key(), "ck_from_env");
        assert_eq!(creds.account_id(), "pg-test-user");
    });
}

#[test]
#[serial]
fn environment_overrides_file() {
    let tmp = TempDir::new().unwrap();
    let p = write_yaml(
        &tmp,
        "chatter.yaml",
        "composio:\n  api_version: legacy\n  timeout_secs: 60\n",
    );

    temp_env::with_vars(
        [
            ("CHATTER__COMPOSIO__API_VERSION", Some("entity")),
            ("CHATTER__COMPOSIO__TIMEOUT_SECS", Some("15")),
        ],
        || {
            let config = ChatterConfigLoader::new()
                .with_file(&p)
                .load()
                .expect("load config");

            assert_eq!(config.composio.api_version, ProviderApiVersion::Entity);
            assert_eq!(config.composio.validation(), ResponseValidation::Lenient);
            assert_eq!(config.composio.timeout_secs, 15);
        },
    );
}

#[test]
#[serial]
fn missing_optional_file_yields_defaults() {
    let tmp = TempDir::new().unwrap();
    let config = ChatterConfigLoader::new()
        .with_optional_file(tmp.path().join("absent.yaml"))
        .load()
        .expect("defaults");

    assert_eq!(
        config.composio.base_url,
        chatter_config::DEFAULT_BASE_URL
    );
    assert_eq!(config.composio.timeout_secs, 60);
    assert!(config.logging.dir.is_none());
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let result = ChatterConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(result.is_err());
}
