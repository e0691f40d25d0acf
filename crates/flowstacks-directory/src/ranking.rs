//! Bayesian-average leaderboard scoring with a linear recency boost.
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::model::{RawReviewAggregate, Tool, ToolAggregate};

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankingOptions {
    /// Prior weight `m`: how many "virtual" reviews at the global mean each
    /// tool starts with.
    pub prior_weight: f64,
    pub max_recency_boost: f64,
    pub recency_window_days: f64,
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            prior_weight: 10.0,
            max_recency_boost: 0.3,
            recency_window_days: 90.0,
        }
    }
}

/// Review-count-weighted mean rating across every aggregate; 0 when there
/// are no reviews at all.
pub fn global_mean(aggregates: &[RawReviewAggregate]) -> f64 {
    let (weighted, total) = aggregates.iter().fold((0.0, 0u64), |(sum, n), a| {
        (sum + a.avg_rating * f64::from(a.review_count), n + u64::from(a.review_count))
    });
    if total == 0 {
        0.0
    } else {
        weighted / total as f64
    }
}

pub fn bayesian_score(avg_rating: f64, review_count: u32, prior_weight: f64, global_mean: f64) -> f64 {
    let v = f64::from(review_count);
    let denom = v + prior_weight;
    if denom <= 0.0 {
        return global_mean;
    }
    (v / denom) * avg_rating + (prior_weight / denom) * global_mean
}

/// Linear decay from `max_recency_boost` at `now` to 0 at the window edge.
pub fn recency_boost(last_review_at: Option<DateTime<Utc>>, now: DateTime<Utc>, options: &RankingOptions) -> f64 {
    let Some(last) = last_review_at else {
        return 0.0;
    };
    let window = options.recency_window_days;
    if window <= 0.0 {
        return 0.0;
    }
    let days = ((now - last).num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY).max(0.0);
    if days > window {
        return 0.0;
    }
    ((window - days) / window) * options.max_recency_boost
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// One aggregate per catalog tool that has at least one review, in catalog
/// order. Aggregates naming unknown slugs still count toward the global mean.
pub fn compute_tool_aggregates<'a>(
    tools: &'a [Tool],
    raw: &[RawReviewAggregate],
    options: &RankingOptions,
    now: DateTime<Utc>,
) -> Vec<ToolAggregate<'a>> {
    if raw.is_empty() {
        return Vec::new();
    }

    let c = global_mean(raw);
    let by_slug: HashMap<&str, &RawReviewAggregate> =
        raw.iter().map(|a| (a.tool_slug.as_str(), a)).collect();

    tools
        .iter()
        .filter_map(|tool| {
            let agg = by_slug.get(tool.slug.as_str())?;
            if agg.review_count == 0 {
                return None;
            }
            let last_review_at = agg.last_review_at.as_deref().and_then(parse_timestamp);
            let bayesian = bayesian_score(agg.avg_rating, agg.review_count, options.prior_weight, c);
            let boost = recency_boost(last_review_at, now, options);
            Some(ToolAggregate {
                tool,
                avg_rating: agg.avg_rating,
                review_count: agg.review_count,
                last_review_at,
                bayesian_score: bayesian,
                final_score: bayesian + boost,
            })
        })
        .collect()
}

/// Best aggregates by final score, after `predicate` and the review floor.
pub fn top_tools<'a, F>(
    aggregates: &[ToolAggregate<'a>],
    predicate: F,
    limit: Option<usize>,
    min_reviews: Option<u32>,
) -> Vec<ToolAggregate<'a>>
where
    F: Fn(&ToolAggregate<'a>) -> bool,
{
    let floor = min_reviews.unwrap_or(0);
    let mut ranked: Vec<ToolAggregate<'a>> = aggregates
        .iter()
        .filter(|a| predicate(*a) && a.review_count >= floor)
        .cloned()
        .collect();
    ranked.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}
