//! Social search clients used by Chatter.
//!
//! Reddit and Twitter/X are both reached through Composio's action API; see
//! [`composio`] for the request, normalization and enrichment pipeline.
pub mod composio;

pub use composio::{ComposioClient, ComposioSearch, NormalizedPost, NormalizedTweet};
