use flowstacks_common::error::CommonError;
use flowstacks_common::mcp_api::StackAction;
use flowstacks_common::redis::RedisCache;

use crate::catalog::Catalog;
use crate::error::AppError;

/// A user's saved tool stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedStack {
    pub tool_slugs: Vec<String>,
    pub persisted: bool,
}

/// Saved stacks keyed by owner, stored as JSON slug arrays under
/// `fsd:v1:stack:{owner_id}`. An empty stack deletes the key.
#[derive(Clone)]
pub struct StackStore {
    redis: RedisCache,
}

impl StackStore {
    pub fn new(redis: RedisCache) -> Self {
        Self { redis }
    }

    /// The saved stack; `persisted` is false when the store could not be read.
    pub async fn get(&self, owner_id: &str) -> Result<SavedStack, AppError> {
        let key = stack_key(owner_id)?;
        let raw = match self.redis.try_get(&key).await {
            Ok(raw) => raw,
            Err(e) => {
                if !matches!(e, CommonError::RedisUnavailable) {
                    tracing::warn!(error = %e, key = %key, "stack read failed");
                }
                return Ok(SavedStack {
                    tool_slugs: Vec::new(),
                    persisted: false,
                });
            }
        };
        let tool_slugs = raw
            .and_then(|raw| {
                serde_json::from_str::<Vec<String>>(&raw)
                    .inspect_err(|e| tracing::warn!(error = %e, key = %key, "discarding malformed stack"))
                    .ok()
            })
            .unwrap_or_default();
        Ok(SavedStack {
            tool_slugs,
            persisted: true,
        })
    }

    /// Replace the stack; slugs are deduplicated keeping first occurrence.
    pub async fn save(&self, catalog: &Catalog, owner_id: &str, tool_slugs: &[String]) -> Result<SavedStack, AppError> {
        let key = stack_key(owner_id)?;
        let mut slugs: Vec<String> = Vec::with_capacity(tool_slugs.len());
        for slug in tool_slugs {
            let slug = slug.trim();
            if catalog.tool_by_slug(slug).is_none() {
                return Err(AppError::ToolNotFound(slug.to_string()));
            }
            if !slugs.iter().any(|s| s == slug) {
                slugs.push(slug.to_string());
            }
        }

        let persisted = if slugs.is_empty() {
            self.redis.delete(&key).await
        } else {
            match serde_json::to_string(&slugs) {
                Ok(raw) => self.redis.set(&key, &raw).await,
                Err(_) => false,
            }
        };
        if !persisted {
            tracing::warn!(owner_id, "stack not persisted");
        }
        Ok(SavedStack {
            tool_slugs: slugs,
            persisted,
        })
    }

    pub async fn modify(
        &self,
        catalog: &Catalog,
        owner_id: &str,
        action: StackAction,
        tool_slug: Option<&str>,
    ) -> Result<SavedStack, AppError> {
        let current = self.get(owner_id).await?;
        let next = next_stack(catalog, current.tool_slugs, action, tool_slug)?;
        self.save(catalog, owner_id, &next).await
    }
}

/// Apply `action` to a stored stack, first dropping slugs that have left the catalog.
fn next_stack(
    catalog: &Catalog,
    mut stored: Vec<String>,
    action: StackAction,
    tool_slug: Option<&str>,
) -> Result<Vec<String>, AppError> {
    stored.retain(|slug| {
        let known = catalog.tool_by_slug(slug).is_some();
        if !known {
            tracing::warn!(tool_slug = %slug, "dropping unknown tool from stored stack");
        }
        known
    });
    apply_action(stored, action, tool_slug)
}

pub fn apply_action(mut slugs: Vec<String>, action: StackAction, tool_slug: Option<&str>) -> Result<Vec<String>, AppError> {
    if let StackAction::Clear = action {
        return Ok(Vec::new());
    }
    let slug = tool_slug
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Invalid("tool_slug is required for this action".to_string()))?;
    let present = slugs.iter().any(|s| s == slug);

    match action {
        StackAction::Add if !present => slugs.push(slug.to_string()),
        StackAction::Remove => slugs.retain(|s| s != slug),
        StackAction::Toggle if present => slugs.retain(|s| s != slug),
        StackAction::Toggle => slugs.push(slug.to_string()),
        StackAction::Add | StackAction::Clear => {}
    }
    Ok(slugs)
}

fn stack_key(owner_id: &str) -> Result<String, AppError> {
    let owner_id = owner_id.trim();
    if owner_id.is_empty() {
        return Err(AppError::Invalid("owner_id must not be empty".to_string()));
    }
    Ok(format!("fsd:v1:stack:{owner_id}"))
}
