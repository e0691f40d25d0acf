//! Leaderboard views over scored tools: time windows, trends, badges and
//! the highlight lists.
use chrono::{DateTime, Duration, Months, Utc};

use crate::model::{Review, Tool, ToolAggregate};
use crate::ranking::{compute_tool_aggregates, top_tools, RankingOptions};
use crate::reviews::aggregate_reviews;

const HIGHLIGHT_LIMIT: usize = 10;
const TRENDING_DAYS: i64 = 14;
const TREND_THRESHOLD_PCT: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFilter {
    #[default]
    All,
    Week,
    Month,
    Trending,
}

impl TimeFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "trending" => Some(Self::Trending),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Week => "week",
            Self::Month => "month",
            Self::Trending => "trending",
        }
    }

    /// Earliest review instant inside the window; `None` for all time.
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::All => None,
            Self::Week => Some(now - Duration::days(7)),
            Self::Month => now.checked_sub_months(Months::new(1)),
            Self::Trending => Some(now - Duration::days(TRENDING_DAYS)),
        }
    }
}

pub fn filter_reviews_by_time(reviews: &[Review], filter: TimeFilter, now: DateTime<Utc>) -> Vec<&Review> {
    match filter.cutoff(now) {
        None => reviews.iter().collect(),
        Some(cutoff) => reviews.iter().filter(|r| r.created_at >= cutoff).collect(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Stable,
    New,
}

impl Trend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Stable => "stable",
            Self::New => "new",
        }
    }
}

/// Direction and absolute percentage change of the final score.
pub fn calculate_trend(current: &ToolAggregate<'_>, previous: Option<&ToolAggregate<'_>>) -> (Trend, f64) {
    let Some(prev) = previous.filter(|p| p.review_count > 0 && p.final_score > 0.0) else {
        return (Trend::New, 0.0);
    };
    let pct = (current.final_score - prev.final_score) / prev.final_score * 100.0;
    let trend = if pct > TREND_THRESHOLD_PCT {
        Trend::Up
    } else if pct < -TREND_THRESHOLD_PCT {
        Trend::Down
    } else {
        Trend::Stable
    };
    (trend, pct.abs())
}

fn is_hidden_gem(a: &ToolAggregate<'_>) -> bool {
    a.avg_rating >= 4.5 && (3..=5).contains(&a.review_count)
}

/// Highly rated tools that few people have reviewed yet.
pub fn hidden_gems<'a>(scores: &[ToolAggregate<'a>]) -> Vec<ToolAggregate<'a>> {
    let mut gems: Vec<ToolAggregate<'a>> = scores.iter().filter(|a| is_hidden_gem(a)).cloned().collect();
    gems.sort_by(|a, b| b.avg_rating.total_cmp(&a.avg_rating));
    gems.truncate(HIGHLIGHT_LIMIT);
    gems
}

pub fn most_reviewed<'a>(scores: &[ToolAggregate<'a>]) -> Vec<ToolAggregate<'a>> {
    let mut out: Vec<ToolAggregate<'a>> = scores.iter().filter(|a| a.review_count > 0).cloned().collect();
    out.sort_by(|a, b| b.review_count.cmp(&a.review_count));
    out.truncate(HIGHLIGHT_LIMIT);
    out
}

/// Tools reviewed at least twice with a review in the last 14 days.
pub fn new_entries<'a>(scores: &[ToolAggregate<'a>], now: DateTime<Utc>) -> Vec<ToolAggregate<'a>> {
    let since = now - Duration::days(TRENDING_DAYS);
    let mut out: Vec<ToolAggregate<'a>> = scores
        .iter()
        .filter(|a| a.review_count >= 2 && a.last_review_at.is_some_and(|t| t >= since))
        .cloned()
        .collect();
    out.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
    out.truncate(HIGHLIGHT_LIMIT);
    out
}

/// Counts of 1- through 5-star ratings for one tool.
pub fn review_distribution(reviews: &[Review], tool_slug: &str) -> [u32; 5] {
    let mut dist = [0u32; 5];
    for r in reviews.iter().filter(|r| r.tool_slug == tool_slug) {
        if (1..=5).contains(&r.rating) {
            dist[usize::from(r.rating) - 1] += 1;
        }
    }
    dist
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub label: &'static str,
    pub variant: &'static str,
    pub icon: &'static str,
}

const TOP_RATED: Badge = Badge {
    label: "Top Rated",
    variant: "default",
    icon: "⭐",
};
const MOST_REVIEWED: Badge = Badge {
    label: "Most Reviewed",
    variant: "secondary",
    icon: "💬",
};
const TRENDING: Badge = Badge {
    label: "Trending",
    variant: "warning",
    icon: "🔥",
};
const HIDDEN_GEM: Badge = Badge {
    label: "Hidden Gem",
    variant: "success",
    icon: "💎",
};

pub fn tool_badges(score: &ToolAggregate<'_>, all: &[ToolAggregate<'_>], now: DateTime<Utc>) -> Vec<Badge> {
    let mut badges = Vec::new();

    if score.avg_rating >= 4.8 && score.review_count >= 5 {
        badges.push(TOP_RATED);
    }

    if score.review_count >= 10 {
        let mut by_count: Vec<(&str, u32)> = all.iter().map(|a| (a.tool.slug.as_str(), a.review_count)).collect();
        by_count.sort_by(|a, b| b.1.cmp(&a.1));
        if by_count.iter().take(3).any(|(slug, _)| *slug == score.tool.slug) {
            badges.push(MOST_REVIEWED);
        }
    }

    if let Some(last) = score.last_review_at {
        let days = (now - last).num_seconds() as f64 / 86_400.0;
        if days <= 7.0 && score.review_count >= 3 {
            badges.push(TRENDING);
        }
    }

    if is_hidden_gem(score) {
        badges.push(HIDDEN_GEM);
    }

    badges
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Score,
    Rating,
    Reviews,
    Recency,
    Name,
}

impl SortBy {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "score" => Some(Self::Score),
            "rating" => Some(Self::Rating),
            "reviews" => Some(Self::Reviews),
            "recency" => Some(Self::Recency),
            "name" => Some(Self::Name),
            _ => None,
        }
    }
}

/// Stable sort; every key except name defaults to descending.
pub fn sort_scores(scores: &mut [ToolAggregate<'_>], sort_by: SortBy, ascending: bool) {
    scores.sort_by(|a, b| {
        let ord = match sort_by {
            SortBy::Score => b.final_score.total_cmp(&a.final_score),
            SortBy::Rating => b.avg_rating.total_cmp(&a.avg_rating),
            SortBy::Reviews => b.review_count.cmp(&a.review_count),
            SortBy::Recency => b.last_review_at.cmp(&a.last_review_at),
            SortBy::Name => a.tool.name.to_lowercase().cmp(&b.tool.name.to_lowercase()),
        };
        if ascending {
            ord.reverse()
        } else {
            ord
        }
    });
}

#[derive(Debug, Clone, Default)]
pub struct LeaderboardQuery {
    pub time_filter: TimeFilter,
    pub sort_by: SortBy,
    pub ascending: bool,
    pub min_reviews: Option<u32>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct LeaderboardRow<'a> {
    pub rank: usize,
    pub score: ToolAggregate<'a>,
    pub trend: Trend,
    pub trend_value: f64,
    pub badges: Vec<Badge>,
}

/// Score every reviewed tool inside the window and compare against the
/// reviews that came before it. For the all-time view the baseline is
/// everything older than 14 days.
pub fn build_leaderboard<'a, F>(
    tools: &'a [Tool],
    reviews: &[Review],
    query: &LeaderboardQuery,
    predicate: F,
    options: &RankingOptions,
    now: DateTime<Utc>,
) -> Vec<LeaderboardRow<'a>>
where
    F: Fn(&ToolAggregate<'a>) -> bool,
{
    let current_raw = aggregate_reviews(filter_reviews_by_time(reviews, query.time_filter, now));
    let current = compute_tool_aggregates(tools, &current_raw, options, now);

    let baseline_cutoff = query
        .time_filter
        .cutoff(now)
        .unwrap_or(now - Duration::days(TRENDING_DAYS));
    let previous_raw = aggregate_reviews(reviews.iter().filter(|r| r.created_at < baseline_cutoff));
    let previous = compute_tool_aggregates(tools, &previous_raw, options, baseline_cutoff);

    let mut ranked = top_tools(&current, predicate, None, query.min_reviews);
    sort_scores(&mut ranked, query.sort_by, query.ascending);
    if let Some(limit) = query.limit {
        ranked.truncate(limit);
    }

    ranked
        .into_iter()
        .enumerate()
        .map(|(i, score)| {
            let prev = previous.iter().find(|p| p.tool.slug == score.tool.slug);
            let (trend, trend_value) = calculate_trend(&score, prev);
            let badges = tool_badges(&score, &current, now);
            LeaderboardRow {
                rank: i + 1,
                score,
                trend,
                trend_value,
                badges,
            }
        })
        .collect()
}
