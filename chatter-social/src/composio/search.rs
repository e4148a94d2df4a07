//! Per-platform topic search: request → transport → normalize → enrich.
use super::client::ComposioClient;
use super::enrich::enrich;
use super::normalize::{normalize_reddit, normalize_twitter};
use super::request::SearchRequest;
use super::types::{NormalizedPost, NormalizedTweet};
use chatter_common::{Platform, Result, SearchCredentials};
use serde_json::Value;
use std::time::Instant;

/// Result count used when the caller has no preference.
pub const DEFAULT_MAX_RESULTS: u32 = 20;

const QUERY_LOG_CHARS: usize = 160;

/// Topic search over Composio with a fixed set of credentials.
///
/// Holds no per-call state, so one instance can serve concurrent searches.
///
/// ```no_run
/// use chatter_common::{ProviderApiVersion, SearchCredentials};
/// use chatter_social::composio::{ComposioClient, ComposioSearch, DEFAULT_MAX_RESULTS};
///
/// # async fn demo() -> chatter_common::Result<()> {
/// let client = ComposioClient::new("https://backend.composio.dev/api", ProviderApiVersion::Legacy)?;
/// let search = ComposioSearch::new(client, SearchCredentials::new("ck_...", "pg-user")?);
/// let posts = search.search_reddit_topic("rust async", DEFAULT_MAX_RESULTS, None).await?;
/// for post in posts.iter().take(5) {
///     println!("{} ({} engagement)", post.title, post.engagement);
/// }
/// # Ok(()) }
/// ```
#[derive(Clone)]
pub struct ComposioSearch {
    client: ComposioClient,
    credentials: SearchCredentials,
}

impl ComposioSearch {
    pub fn new(client: ComposioClient, credentials: SearchCredentials) -> Self {
        Self {
            client,
            credentials,
        }
    }

    pub fn client(&self) -> &ComposioClient {
        &self.client
    }

    async fn fetch(
        &self,
        platform: Platform,
        query: &str,
        max_result_count: u32,
        connection_id: Option<&str>,
    ) -> Result<Value> {
        let request = SearchRequest::new(platform, query, max_result_count);
        let query_snippet: String = query.chars().take(QUERY_LOG_CHARS).collect();
        tracing::debug!(
            %platform,
            query = %query_snippet,
            limit = request.max_result_count(),
            api_version = ?self.client.api_version(),
            "composio.search.start"
        );
        self.client
            .execute(&request, &self.credentials, connection_id)
            .await
    }

    /// Search Reddit for `query` and return enriched posts in provider order.
    pub async fn search_reddit_topic(
        &self,
        query: &str,
        max_result_count: u32,
        connection_id: Option<&str>,
    ) -> Result<Vec<NormalizedPost>> {
        let started = Instant::now();
        let payload = self
            .fetch(Platform::Reddit, query, max_result_count, connection_id)
            .await?;
        let posts = enrich(normalize_reddit(&payload)?);
        tracing::info!(
            platform = "reddit",
            results = posts.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "composio.search.done"
        );
        Ok(posts)
    }

    /// Search recent tweets for `query`; fewer than 10 results are never requested.
    pub async fn search_twitter_topic(
        &self,
        query: &str,
        max_result_count: u32,
        connection_id: Option<&str>,
    ) -> Result<Vec<NormalizedTweet>> {
        let started = Instant::now();
        let payload = self
            .fetch(Platform::Twitter, query, max_result_count, connection_id)
            .await?;
        let tweets = enrich(normalize_twitter(&payload)?);
        tracing::info!(
            platform = "twitter",
            results = tweets.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "composio.search.done"
        );
        Ok(tweets)
    }
}
