//! Engagement scoring for normalized records.
use super::types::{NormalizedPost, NormalizedTweet};

/// A record that can carry a derived engagement score.
pub trait Engagement {
    /// Weighted sum of the record's platform metrics.
    fn engagement_score(&self) -> i64;

    fn set_engagement(&mut self, value: i64);
}

impl Engagement for NormalizedPost {
    /// `score + num_comments * 2`
    fn engagement_score(&self) -> i64 {
        self.score
            .saturating_add(self.num_comments.saturating_mul(2))
    }

    fn set_engagement(&mut self, value: i64) {
        self.engagement = value;
    }
}

impl Engagement for NormalizedTweet {
    /// `likes + retweets * 2 + replies`; impressions do not count.
    fn engagement_score(&self) -> i64 {
        let m = &self.metrics;
        m.likes
            .saturating_add(m.retweets.saturating_mul(2))
            .saturating_add(m.replies)
    }

    fn set_engagement(&mut self, value: i64) {
        self.engagement = value;
    }
}

/// Stamp every record with its engagement score, keeping order.
pub fn enrich<T: Engagement>(records: Vec<T>) -> Vec<T> {
    records
        .into_iter()
        .map(|mut record| {
            let score = record.engagement_score();
            record.set_engagement(score);
            record
        })
        .collect()
}
