//! Flatten Composio search payloads into [`NormalizedPost`] / [`NormalizedTweet`].
//!
//! The provider nests its result list in a few different ways and uses two
//! per-item shapes. Missing fields default to empty/zero; only a non-list in
//! the items position is an error. Items of no known shape are skipped.
use super::types::{NormalizedPost, NormalizedTweet, Timestamp, TweetMetrics};
use chatter_common::{ChatterError, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;

const REDDIT_BASE: &str = "https://reddit.com";
const TITLE_MAX_CHARS: usize = 200;

/// Result items plus the object they were found in (for `includes`).
struct Payload<'a> {
    items: &'a [Value],
    containers: Vec<&'a Map<String, Value>>,
}

fn malformed(what: &Value) -> ChatterError {
    let kind = match what {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    };
    ChatterError::Malformed(format!("expected a list of results, found {kind}"))
}

fn locate_items(response: &Value) -> Result<Payload<'_>> {
    let outer = match response {
        Value::Array(items) => {
            return Ok(Payload {
                items,
                containers: Vec::new(),
            });
        }
        Value::Object(outer) => outer,
        other => return Err(malformed(other)),
    };

    match outer.get("data").unwrap_or(response) {
        Value::Array(items) => Ok(Payload {
            items,
            containers: vec![outer],
        }),
        Value::Object(inner) => match inner.get("data") {
            None => Ok(Payload {
                items: &[],
                containers: vec![inner],
            }),
            Some(Value::Array(items)) => {
                let mut containers = vec![inner];
                if !std::ptr::eq(inner, outer) {
                    containers.push(outer);
                }
                Ok(Payload { items, containers })
            }
            Some(other) => Err(malformed(other)),
        },
        other => Err(malformed(other)),
    }
}

// ==============================
// Field access
// ==============================

fn text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn count(obj: &Map<String, Value>, key: &str) -> Option<i64> {
    let Value::Number(n) = obj.get(key)? else {
        return None;
    };
    n.as_i64()
        .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
        .or_else(|| n.as_f64().map(|f| f as i64))
}

fn timestamp(obj: &Map<String, Value>, key: &str) -> Option<Timestamp> {
    match obj.get(key)? {
        Value::Number(n) => Some(Timestamp::Epoch(n.clone())),
        Value::String(s) => Some(Timestamp::Text(s.clone())),
        _ => None,
    }
}

fn nested<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    obj.get(key)?.as_object()
}

fn first_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

// ==============================
// Reddit
// ==============================

/// Which mapping a Reddit result item gets.
#[derive(Debug)]
pub enum RedditItem<'a> {
    /// Native Reddit listing item (has `title`).
    RedditShaped(&'a Map<String, Value>),
    /// Post-style item with `text` and a `metrics` block.
    SocialPostShaped(&'a Map<String, Value>),
    Unrecognized,
}

impl<'a> RedditItem<'a> {
    pub fn classify(item: &'a Value) -> Self {
        match item.as_object() {
            Some(obj) if obj.contains_key("title") => RedditItem::RedditShaped(obj),
            Some(obj) if obj.contains_key("text") => RedditItem::SocialPostShaped(obj),
            _ => RedditItem::Unrecognized,
        }
    }

    pub fn into_post(self) -> Option<NormalizedPost> {
        match self {
            RedditItem::RedditShaped(obj) => Some(reddit_shaped(obj)),
            RedditItem::SocialPostShaped(obj) => Some(social_post_shaped(obj)),
            RedditItem::Unrecognized => None,
        }
    }
}

fn reddit_shaped(obj: &Map<String, Value>) -> NormalizedPost {
    let url = text(obj, "url").unwrap_or_else(|| {
        format!(
            "{REDDIT_BASE}{}",
            text(obj, "permalink").unwrap_or_default()
        )
    });
    NormalizedPost {
        title: text(obj, "title").unwrap_or_default(),
        url,
        score: count(obj, "score").unwrap_or(0),
        num_comments: count(obj, "num_comments").unwrap_or(0),
        author: text(obj, "author").unwrap_or_default(),
        subreddit: text(obj, "subreddit").unwrap_or_default(),
        created_utc: timestamp(obj, "created_utc").unwrap_or_default(),
        selftext: text(obj, "selftext").unwrap_or_default(),
        engagement: 0,
    }
}

fn social_post_shaped(obj: &Map<String, Value>) -> NormalizedPost {
    let metrics = nested(obj, "metrics");
    NormalizedPost {
        title: first_chars(&text(obj, "text").unwrap_or_default(), TITLE_MAX_CHARS),
        url: text(obj, "url").unwrap_or_default(),
        score: metrics.and_then(|m| count(m, "likes")).unwrap_or(0),
        num_comments: metrics.and_then(|m| count(m, "replies")).unwrap_or(0),
        author: text(obj, "username")
            .or_else(|| text(obj, "author"))
            .unwrap_or_default(),
        subreddit: text(obj, "subreddit").unwrap_or_default(),
        created_utc: timestamp(obj, "created_at")
            .or_else(|| timestamp(obj, "created_utc"))
            .unwrap_or_else(|| Timestamp::Text(String::new())),
        selftext: String::new(),
        engagement: 0,
    }
}

/// Normalize a Reddit search payload, preserving item order.
pub fn normalize_reddit(response: &Value) -> Result<Vec<NormalizedPost>> {
    let payload = locate_items(response)?;
    let mut skipped = 0usize;
    let posts: Vec<NormalizedPost> = payload
        .items
        .iter()
        .filter_map(|item| {
            let post = RedditItem::classify(item).into_post();
            if post.is_none() {
                skipped += 1;
            }
            post
        })
        .collect();
    if skipped > 0 {
        tracing::debug!(skipped, kept = posts.len(), "composio.reddit.unrecognized_items");
    }
    Ok(posts)
}

// ==============================
// Twitter
// ==============================

struct Author {
    username: String,
    name: String,
}

fn author_index(containers: &[&Map<String, Value>]) -> HashMap<String, Author> {
    let users = containers
        .iter()
        .filter_map(|c| nested(c, "includes"))
        .filter_map(|inc| inc.get("users")?.as_array())
        .next();

    users
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
        .filter_map(|u| {
            let id = text(u, "id")?;
            Some((
                id,
                Author {
                    username: text(u, "username").unwrap_or_default(),
                    name: text(u, "name").unwrap_or_default(),
                },
            ))
        })
        .collect()
}

fn tweet_fields(obj: &Map<String, Value>) -> NormalizedTweet {
    let pm = nested(obj, "public_metrics");
    let metric = |key: &str| pm.and_then(|m| count(m, key)).unwrap_or(0);
    NormalizedTweet {
        id: text(obj, "id").unwrap_or_default(),
        text: text(obj, "text").unwrap_or_default(),
        author_id: text(obj, "author_id").unwrap_or_default(),
        username: String::new(),
        name: String::new(),
        created_at: text(obj, "created_at").unwrap_or_default(),
        metrics: TweetMetrics {
            likes: metric("like_count"),
            retweets: metric("retweet_count"),
            replies: metric("reply_count"),
            impressions: metric("impression_count"),
        },
        urls: Vec::new(),
        mentions: Vec::new(),
        hashtags: Vec::new(),
        tweet_url: String::new(),
        engagement: 0,
    }
}

/// Normalize a Twitter recent-search payload, preserving item order.
///
/// Authors are resolved from `includes.users` in a second pass.
pub fn normalize_twitter(response: &Value) -> Result<Vec<NormalizedTweet>> {
    let payload = locate_items(response)?;
    let mut tweets: Vec<NormalizedTweet> = payload
        .items
        .iter()
        .filter_map(Value::as_object)
        .map(tweet_fields)
        .collect();

    let authors = author_index(&payload.containers);
    for tweet in &mut tweets {
        if let Some(author) = authors.get(&tweet.author_id) {
            tweet.username = author.username.clone();
            tweet.name = author.name.clone();
        }
        let handle = if tweet.username.is_empty() {
            "unknown"
        } else {
            tweet.username.as_str()
        };
        tweet.tweet_url = format!("https://x.com/{handle}/status/{}", tweet.id);
    }
    Ok(tweets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatter_common::ErrorKind;
    use serde_json::json;

    #[test]
    fn reddit_item_defaults_and_permalink_url() {
        let posts =
            normalize_reddit(&json!([{ "title": "T", "permalink": "/r/x/1" }])).unwrap();
        assert_eq!(posts.len(), 1);
        let p = &posts[0];
        assert_eq!(p.title, "T");
        assert_eq!(p.url, "https://reddit.com/r/x/1");
        assert_eq!(p.score, 0);
        assert_eq!(p.num_comments, 0);
        assert_eq!(p.author, "");
        assert_eq!(p.subreddit, "");
        assert_eq!(p.selftext, "");
        assert_eq!(p.created_utc, Timestamp::default());
    }

    #[test]
    fn reddit_item_keeps_direct_url_and_numbers() {
        let posts = normalize_reddit(&json!({ "data": [{
            "title": "Async in Rust",
            "url": "https://example.com/post",
            "permalink": "/r/rust/abc",
            "score": 120,
            "num_comments": 33,
            "author": "ferris",
            "subreddit": "rust",
            "created_utc": 1700000000.0,
            "selftext": "body"
        }]}))
        .unwrap();
        let p = &posts[0];
        assert_eq!(p.url, "https://example.com/post");
        assert_eq!(p.score, 120);
        assert_eq!(p.num_comments, 33);
        assert_eq!(p.author, "ferris");
        assert_eq!(p.subreddit, "rust");
        assert_eq!(
            p.created_utc,
            Timestamp::Epoch(serde_json::Number::from_f64(1_700_000_000.0).unwrap())
        );
        assert_eq!(p.selftext, "body");
    }

    #[test]
    fn social_post_fallback_mapping() {
        let posts = normalize_reddit(&json!([{
            "text": "hello world",
            "metrics": { "likes": 5, "replies": 2 }
        }]))
        .unwrap();
        let p = &posts[0];
        assert_eq!(p.title, "hello world");
        assert_eq!(p.score, 5);
        assert_eq!(p.num_comments, 2);
        assert_eq!(p.url, "");
        assert_eq!(p.selftext, "");
        assert_eq!(p.created_utc, Timestamp::Text(String::new()));
    }

    #[test]
    fn social_post_title_is_first_200_chars() {
        let long: String = "ab".repeat(150);
        let posts = normalize_reddit(&json!([{ "text": long.clone() }])).unwrap();
        assert_eq!(posts[0].title.chars().count(), 200);
        assert!(long.starts_with(&posts[0].title));
    }

    #[test]
    fn social_post_author_and_time_fallbacks() {
        let posts = normalize_reddit(&json!([
            { "text": "a", "username": "u1", "author": "a1", "created_at": "2025-01-01T00:00:00Z" },
            { "text": "b", "author": "a2", "created_utc": 1700000000 }
        ]))
        .unwrap();
        assert_eq!(posts[0].author, "u1");
        assert_eq!(
            posts[0].created_utc,
            Timestamp::Text("2025-01-01T00:00:00Z".into())
        );
        assert_eq!(posts[1].author, "a2");
        assert_eq!(posts[1].created_utc, Timestamp::Epoch(1_700_000_000_u64.into()));
    }

    #[test]
    fn unrecognized_items_are_dropped_without_error() {
        let posts = normalize_reddit(&json!([
            { "title": "first" },
            { "id": "no-title-no-text" },
            "just a string",
            { "text": "last" }
        ]))
        .unwrap();
        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["first", "last"]);
    }

    #[test]
    fn classify_prefers_title_over_text() {
        let item = json!({ "title": "t", "text": "x" });
        assert!(matches!(
            RedditItem::classify(&item),
            RedditItem::RedditShaped(_)
        ));
        assert!(matches!(
            RedditItem::classify(&json!(42)),
            RedditItem::Unrecognized
        ));
    }

    #[test]
    fn items_found_at_every_nesting_level() {
        let flat = json!([{ "title": "a" }]);
        let once = json!({ "data": [{ "title": "a" }] });
        let twice = json!({ "data": { "data": [{ "title": "a" }] } });
        for payload in [flat, once, twice] {
            assert_eq!(normalize_reddit(&payload).unwrap().len(), 1, "{payload}");
        }
    }

    #[test]
    fn object_without_data_has_no_items() {
        assert!(normalize_reddit(&json!({ "posts": [] })).unwrap().is_empty());
        assert!(normalize_reddit(&json!({ "data": {} })).unwrap().is_empty());
    }

    #[test]
    fn non_list_items_are_malformed() {
        for payload in [
            json!({ "data": { "data": "oops" } }),
            json!({ "data": 3 }),
            json!(null),
        ] {
            let err = normalize_reddit(&payload).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Malformed);
        }
    }

    #[test]
    fn reddit_order_is_preserved() {
        let posts = normalize_reddit(&json!([
            { "title": "3" }, { "title": "1" }, { "title": "2" }
        ]))
        .unwrap();
        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["3", "1", "2"]);
    }

    #[test]
    fn tweets_resolve_authors_from_includes() {
        let tweets = normalize_twitter(&json!({
            "data": [
                {
                    "id": "1",
                    "text": "hello",
                    "author_id": "42",
                    "created_at": "2025-09-01T12:00:00Z",
                    "public_metrics": {
                        "like_count": 10, "retweet_count": 3,
                        "reply_count": 2, "impression_count": 900
                    }
                },
                { "id": "2", "text": "anon", "author_id": "99" }
            ],
            "includes": { "users": [ { "id": "42", "username": "alice", "name": "Alice" } ] }
        }))
        .unwrap();

        assert_eq!(tweets.len(), 2);
        let t = &tweets[0];
        assert_eq!(t.username, "alice");
        assert_eq!(t.name, "Alice");
        assert_eq!(t.tweet_url, "https://x.com/alice/status/1");
        assert_eq!(
            t.metrics,
            TweetMetrics {
                likes: 10,
                retweets: 3,
                replies: 2,
                impressions: 900
            }
        );
        assert!(t.urls.is_empty() && t.mentions.is_empty() && t.hashtags.is_empty());

        let anon = &tweets[1];
        assert_eq!(anon.username, "");
        assert_eq!(anon.name, "");
        assert_eq!(anon.tweet_url, "https://x.com/unknown/status/2");
        assert_eq!(anon.metrics, TweetMetrics::default());
    }

    #[test]
    fn tweets_find_includes_in_nested_wrapper() {
        let tweets = normalize_twitter(&json!({
            "data": {
                "data": [{ "id": "7", "text": "x", "author_id": "5" }],
                "includes": { "users": [{ "id": "5", "username": "bob" }] }
            }
        }))
        .unwrap();
        assert_eq!(tweets[0].username, "bob");
        assert_eq!(tweets[0].tweet_url, "https://x.com/bob/status/7");
    }

    #[test]
    fn tweet_order_is_preserved() {
        let tweets = normalize_twitter(&json!([
            { "id": "b", "text": "second" },
            { "id": "a", "text": "first" }
        ]))
        .unwrap();
        let ids: Vec<&str> = tweets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn numeric_tweet_ids_become_strings() {
        let tweets = normalize_twitter(&json!([{ "id": 123, "author_id": 5 }])).unwrap();
        assert_eq!(tweets[0].id, "123");
        assert_eq!(tweets[0].author_id, "5");
        assert_eq!(tweets[0].text, "");
    }
}
