//! Action request bodies for both Composio contract versions.
use chatter_common::{Platform, ProviderApiVersion, SearchCredentials};
use serde::Serialize;

pub const REDDIT_SEARCH_ACTION: &str = "REDDIT_REDDIT_SEARCH";
pub const TWITTER_RECENT_SEARCH_ACTION: &str = "TWITTER_RECENT_SEARCH";

/// What to search for, with the platform's result floor already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    query: String,
    max_result_count: u32,
    platform: Platform,
}

impl SearchRequest {
    pub fn new(platform: Platform, query: impl Into<String>, requested: u32) -> Self {
        let max_result_count = platform.clamp_result_count(requested);
        if max_result_count != requested {
            tracing::debug!(
                %platform,
                requested,
                sent = max_result_count,
                "composio.request.limit_raised"
            );
        }
        Self {
            query: query.into(),
            max_result_count,
            platform,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn max_result_count(&self) -> u32 {
        self.max_result_count
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn action(&self) -> &'static str {
        match self.platform {
            Platform::Reddit => REDDIT_SEARCH_ACTION,
            Platform::Twitter => TWITTER_RECENT_SEARCH_ACTION,
        }
    }

    /// Path relative to the API base, e.g. `v2/actions/TWITTER_RECENT_SEARCH/execute`.
    pub fn path(&self) -> String {
        format!("v2/actions/{}/execute", self.action())
    }

    /// Body for `version`. The connection id only exists in the legacy contract.
    pub fn body<'a>(
        &'a self,
        version: ProviderApiVersion,
        credentials: &'a SearchCredentials,
        connection_id: Option<&'a str>,
    ) -> ActionBody<'a> {
        let input = match self.platform {
            Platform::Reddit => ActionInput {
                query: &self.query,
                limit: Some(self.max_result_count),
                max_results: None,
            },
            Platform::Twitter => ActionInput {
                query: &self.query,
                limit: None,
                max_results: Some(self.max_result_count),
            },
        };
        match version {
            ProviderApiVersion::Legacy => ActionBody::Legacy {
                user_id: credentials.account_id(),
                input,
                connected_account_id: connection_id.filter(|c| !c.is_empty()),
            },
            ProviderApiVersion::Entity => {
                if connection_id.is_some() {
                    tracing::debug!("composio.request.connection_id_ignored");
                }
                ActionBody::Entity {
                    app_name: app_name(self.platform),
                    entity_id: credentials.account_id(),
                    input,
                }
            }
        }
    }
}

fn app_name(platform: Platform) -> &'static str {
    match platform {
        Platform::Reddit => "REDDIT",
        Platform::Twitter => "TWITTER",
    }
}

#[derive(Debug, Serialize)]
pub struct ActionInput<'a> {
    pub query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ActionBody<'a> {
    Legacy {
        #[serde(rename = "userId")]
        user_id: &'a str,
        input: ActionInput<'a>,
        #[serde(rename = "connectedAccountId", skip_serializing_if = "Option::is_none")]
        connected_account_id: Option<&'a str>,
    },
    Entity {
        #[serde(rename = "appName")]
        app_name: &'static str,
        #[serde(rename = "entityId")]
        entity_id: &'a str,
        input: ActionInput<'a>,
    },
}
