use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use flowstacks_common::redis::RedisCache;

use crate::catalog::Catalog;
use crate::error::AppError;
use crate::model::{RawReviewAggregate, Review};

const REVIEWED_SET_KEY: &str = "fsd:v1:reviewed";

#[derive(Debug, Clone)]
pub struct SubmittedReview {
    pub review: Review,
    /// False when Redis is absent or the write failed.
    pub stored: bool,
}

/// Ratings from the optional seed file plus those submitted through the
/// server and kept in Redis.
#[derive(Clone)]
pub struct ReviewStore {
    redis: RedisCache,
    seed: Arc<Vec<Review>>,
}

impl ReviewStore {
    pub fn new(redis: RedisCache, seed: Vec<Review>) -> Self {
        Self {
            redis,
            seed: Arc::new(seed),
        }
    }

    /// Read a JSON array of reviews, e.g. `[{"toolSlug":"cursor","rating":5,"createdAt":"..."}]`.
    pub fn load_seed(path: &Path) -> Result<Vec<Review>, AppError> {
        let file = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| AppError::Catalog {
            file: file.clone(),
            message: format!("failed to read: {e}"),
        })?;
        serde_json::from_str(&content).map_err(|e| AppError::Catalog {
            file,
            message: format!("invalid JSON: {e}"),
        })
    }

    pub fn seed_len(&self) -> usize {
        self.seed.len()
    }

    pub async fn submit(
        &self,
        catalog: &Catalog,
        tool_slug: &str,
        rating: u8,
        user_id: Option<String>,
        body: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<SubmittedReview, AppError> {
        validate_rating(rating)?;
        if catalog.tool_by_slug(tool_slug).is_none() {
            return Err(AppError::ToolNotFound(tool_slug.to_string()));
        }

        let review = Review {
            tool_slug: tool_slug.to_string(),
            rating,
            created_at: now,
            user_id: user_id.filter(|u| !u.trim().is_empty()),
            body: body.filter(|b| !b.trim().is_empty()),
        };

        let stored = match serde_json::to_string(&review) {
            Ok(raw) => {
                let pushed = self.redis.push(&reviews_key(tool_slug), &raw).await;
                pushed && self.redis.add_member(REVIEWED_SET_KEY, tool_slug).await
            }
            Err(e) => {
                tracing::warn!(error = %e, tool_slug, "failed to encode review");
                false
            }
        };
        if !stored {
            tracing::warn!(tool_slug, "review not persisted");
        }

        Ok(SubmittedReview { review, stored })
    }

    pub async fn reviews_for(&self, tool_slug: &str) -> Vec<Review> {
        let mut out: Vec<Review> = self
            .seed
            .iter()
            .filter(|r| r.tool_slug == tool_slug)
            .cloned()
            .collect();
        out.extend(self.stored_reviews(tool_slug).await);
        out
    }

    pub async fn all_reviews(&self) -> Vec<Review> {
        let mut out: Vec<Review> = self.seed.as_ref().clone();
        let Some(mut slugs) = self.redis.members(REVIEWED_SET_KEY).await else {
            return out;
        };
        slugs.sort();
        for slug in slugs {
            out.extend(self.stored_reviews(&slug).await);
        }
        out
    }

    async fn stored_reviews(&self, tool_slug: &str) -> Vec<Review> {
        let Some(raw) = self.redis.list(&reviews_key(tool_slug)).await else {
            return Vec::new();
        };
        raw.iter()
            .filter_map(|item| match serde_json::from_str::<Review>(item) {
                Ok(r) => Some(r),
                Err(e) => {
                    tracing::warn!(error = %e, tool_slug, "skipping malformed stored review");
                    None
                }
            })
            .collect()
    }
}

pub fn validate_rating(rating: u8) -> Result<(), AppError> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(AppError::Invalid(format!("rating must be between 1 and 5, got {rating}")))
    }
}

fn reviews_key(tool_slug: &str) -> String {
    format!("fsd:v1:reviews:{tool_slug}")
}

/// Fold individual reviews into per-tool aggregates, in first-seen slug order.
pub fn aggregate_reviews<'r, I>(reviews: I) -> Vec<RawReviewAggregate>
where
    I: IntoIterator<Item = &'r Review>,
{
    struct Acc {
        sum: u64,
        count: u32,
        last: DateTime<Utc>,
    }

    let mut order: Vec<String> = Vec::new();
    let mut acc: HashMap<String, Acc> = HashMap::new();
    for review in reviews {
        match acc.get_mut(&review.tool_slug) {
            Some(a) => {
                a.sum += u64::from(review.rating);
                a.count += 1;
                a.last = a.last.max(review.created_at);
            }
            None => {
                order.push(review.tool_slug.clone());
                acc.insert(
                    review.tool_slug.clone(),
                    Acc {
                        sum: u64::from(review.rating),
                        count: 1,
                        last: review.created_at,
                    },
                );
            }
        }
    }

    order
        .into_iter()
        .filter_map(|slug| {
            let a = acc.remove(&slug)?;
            Some(RawReviewAggregate {
                avg_rating: a.sum as f64 / f64::from(a.count),
                review_count: a.count,
                last_review_at: Some(a.last.to_rfc3339()),
                tool_slug: slug,
            })
        })
        .collect()
}
