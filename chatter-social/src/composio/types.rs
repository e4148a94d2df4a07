use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Creation time as the provider sent it: Reddit uses epoch seconds, the
/// social-post shape an ISO string. Numbers are kept as sent, so an integer
/// epoch stays an integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Epoch(Number),
    Text(String),
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::Epoch(Number::from(0_u64))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPost {
    pub title: String,
    pub url: String,
    pub score: i64,
    pub num_comments: i64,
    pub author: String,
    pub subreddit: String,
    pub created_utc: Timestamp,
    pub selftext: String,
    /// Zero until enrichment runs.
    pub engagement: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetMetrics {
    pub likes: i64,
    pub retweets: i64,
    pub replies: i64,
    pub impressions: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTweet {
    pub id: String,
    pub text: String,
    pub author_id: String,
    pub username: String,
    pub name: String,
    pub created_at: String,
    pub metrics: TweetMetrics,
    // Entity extraction is not implemented; these are always empty.
    pub urls: Vec<String>,
    pub mentions: Vec<String>,
    pub hashtags: Vec<String>,
    pub tweet_url: String,
    /// Zero until enrichment runs.
    pub engagement: i64,
}
