//! Composio action API integration for Reddit and Twitter/X search.
//!
//! A search runs one linear pipeline: build the action body ([`request`]),
//! POST it once and validate the reply ([`client`]), flatten the provider's
//! variable JSON into records ([`normalize`]), then score them ([`enrich`]).
//! [`search::ComposioSearch`] wires the stages together per platform.
pub mod client;
pub mod enrich;
pub mod normalize;
pub mod request;
pub mod search;
pub mod types;

pub use client::ComposioClient;
pub use search::{ComposioSearch, DEFAULT_MAX_RESULTS};
pub use types::{NormalizedPost, NormalizedTweet, Timestamp, TweetMetrics};
