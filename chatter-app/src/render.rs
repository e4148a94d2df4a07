use chatter_social::{NormalizedPost, NormalizedTweet};
use std::fmt::Write;

const PREVIEW_COUNT: usize = 5;
const PREVIEW_CHARS: usize = 80;

fn preview(s: &str) -> String {
    s.chars().take(PREVIEW_CHARS).collect()
}

pub fn posts(posts: &[NormalizedPost]) -> String {
    let mut out = format!("Found {} posts:\n", posts.len());
    for post in posts.iter().take(PREVIEW_COUNT) {
        let _ = writeln!(
            out,
            "  - {}... ({} engagement)",
            preview(&post.title),
            post.engagement
        );
    }
    out
}

pub fn tweets(tweets: &[NormalizedTweet]) -> String {
    let mut out = format!("Found {} tweets:\n", tweets.len());
    for tweet in tweets.iter().take(PREVIEW_COUNT) {
        let _ = writeln!(
            out,
            "  @{}: {}... ({} engagement)",
            tweet.username,
            preview(&tweet.text),
            tweet.engagement
        );
    }
    out
}
