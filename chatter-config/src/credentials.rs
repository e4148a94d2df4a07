//! Composio credential lookup from the process environment.
//!
//! Nothing here caches: every call re-reads the environment.
use chatter_common::{ChatterError, PLACEHOLDER_ACCOUNT_ID, Platform, Result, SearchCredentials};

pub const API_KEY_ENV: &str = "COMPOSIO_API_KEY";
pub const USER_ID_ENV: &str = "COMPOSIO_USER_ID";
pub const REDDIT_CONNECTION_ENV: &str = "COMPOSIO_REDDIT_CONNECTION_ID";
pub const TWITTER_CONNECTION_ENV: &str = "COMPOSIO_TWITTER_CONNECTION_ID";

/// Where users are told to put the key when it is missing.
pub const ENV_FILE_HINT: &str = "~/.openclaw/.env";

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Read `COMPOSIO_API_KEY`, failing when it is unset or empty.
pub fn resolve_api_key() -> Result<String> {
    non_empty_var(API_KEY_ENV).ok_or(ChatterError::MissingCredential {
        variable: API_KEY_ENV,
        location: ENV_FILE_HINT,
    })
}

/// Read `COMPOSIO_USER_ID`, or the placeholder account id when unset.
pub fn resolve_account_id() -> String {
    non_empty_var(USER_ID_ENV).unwrap_or_else(|| PLACEHOLDER_ACCOUNT_ID.to_string())
}

pub fn connection_env_var(platform: Platform) -> &'static str {
    match platform {
        Platform::Reddit => REDDIT_CONNECTION_ENV,
        Platform::Twitter => TWITTER_CONNECTION_ENV,
    }
}

/// Legacy connected-account id for `platform`, if one is configured.
pub fn resolve_connection_id(platform: Platform) -> Option<String> {
    non_empty_var(connection_env_var(platform))
}

pub fn credentials_from_env() -> Result<SearchCredentials> {
    SearchCredentials::new(resolve_api_key()?, resolve_account_id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatter_common::ErrorKind;

    #[test]
    fn api_key_present() {
        temp_env::with_var(API_KEY_ENV, Some("ck_live"), || {
            assert_eq!(resolve_api_key().unwrap(), "ck_live");
        });
    }

    #[test]
    fn api_key_unset_is_configuration_error() {
        temp_env::with_var_unset(API_KEY_ENV, || {
            let err = resolve_api_key().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Configuration);
            let msg = err.to_string();
            assert!(msg.contains(API_KEY_ENV));
            assert!(msg.contains(ENV_FILE_HINT));
        });
    }

    #[test]
    fn whitespace_api_key_is_still_set() {
        temp_env::with_var(API_KEY_ENV, Some("   "), || {
            assert_eq!(resolve_api_key().unwrap(), "   ");
        });
    }

    #[test]
    fn api_key_empty_is_configuration_error() {
        temp_env::with_var(API_KEY_ENV, Some(""), || {
            assert_eq!(
                resolve_api_key().unwrap_err().kind(),
                ErrorKind::Configuration
            );
        });
    }

    #[test]
    fn account_id_defaults_to_placeholder() {
        temp_env::with_var_unset(USER_ID_ENV, || {
            assert_eq!(resolve_account_id(), PLACEHOLDER_ACCOUNT_ID);
        });
        temp_env::with_var(USER_ID_ENV, Some("pg-42"), || {
            assert_eq!(resolve_account_id(), "pg-42");
        });
    }

    #[test]
    fn connection_ids_are_per_platform() {
        temp_env::with_vars(
            [
                (REDDIT_CONNECTION_ENV, Some("conn-r")),
                (TWITTER_CONNECTION_ENV, None),
            ],
            || {
                assert_eq!(
                    resolve_connection_id(Platform::Reddit).as_deref(),
                    Some("conn-r")
                );
                assert_eq!(resolve_connection_id(Platform::Twitter), None);
            },
        );
    }

    #[test]
    fn credentials_from_env_combines_both() {
        temp_env::with_vars(
            [(API_KEY_ENV, Some("k")), (USER_ID_ENV, Some("u"))],
            || {
                let creds = credentials_from_env().unwrap();
                assert_eq!(creds.api_key(), "k");
                assert_eq!(creds.account_id(), "u");
            },
        );
    }
}
