use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use flowstacks_common::web_search::SearchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pricing {
    Free,
    Freemium,
    Paid,
}

impl Pricing {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Some(Self::Free),
            "freemium" => Some(Self::Freemium),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Freemium => "freemium",
            Self::Paid => "paid",
        }
    }
}

/// A catalog entry, e.g. "GitHub Copilot". Field names follow the
/// camelCase layout of `tools.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub id: String,
    pub name: String,
    /// Unique across the catalog, e.g. "github-copilot".
    pub slug: String,
    pub tagline: String,
    pub description: String,
    /// e.g. "AI Code Assistants"
    pub category: String,
    /// e.g. "AI Coding & Developer Tools"
    pub group: String,
    pub pricing: Pricing,
    pub website_url: String,
    #[serde(default)]
    pub product_hunt_url: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub best_for: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub featured: bool,
}

/// A curated, persona-oriented list of tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub tagline: String,
    pub description: String,
    pub persona: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tool_slugs: Vec<String>,
    #[serde(default)]
    pub featured: bool,
}

/// A web-search hit being linked back to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub snippet: String,
    pub url: String,
    pub source: Option<String>,
}

impl From<SearchResult> for Article {
    fn from(r: SearchResult) -> Self {
        Self {
            title: r.title,
            snippet: r.snippet,
            url: r.url,
            source: r.source,
        }
    }
}

/// Per-tool rating summary in the shape the review store exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReviewAggregate {
    pub tool_slug: String,
    pub avg_rating: f64,
    pub review_count: u32,
    /// RFC 3339 timestamp; `None` when unknown.
    pub last_review_at: Option<String>,
}

/// One rating, as stored in Redis and in the seed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub tool_slug: String,
    /// 1 through 5.
    pub rating: u8,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Ranking record for one reviewed tool. Recomputed per request.
#[derive(Debug, Clone)]
pub struct ToolAggregate<'a> {
    pub tool: &'a Tool,
    pub avg_rating: f64,
    pub review_count: u32,
    pub last_review_at: Option<DateTime<Utc>>,
    pub bayesian_score: f64,
    pub final_score: f64,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, Utc};

    use super::{Pricing, Review, Tool};

    pub fn tool(slug: &str, name: &str, category: &str) -> Tool {
        Tool {
            id: slug.to_string(),
            name: name.to_string(),
            slug: slug.to_string(),
            tagline: format!("{name} tagline"),
            description: format!("{name} description"),
            category: category.to_string(),
            group: "AI Productivity".to_string(),
            pricing: Pricing::Freemium,
            website_url: format!("https://{slug}.example.com"),
            product_hunt_url: None,
            logo_url: None,
            tags: Vec::new(),
            best_for: Vec::new(),
            platforms: Vec::new(),
            featured: false,
        }
    }

    pub fn with_tags(mut tool: Tool, tags: &[&str]) -> Tool {
        tool.tags = tags.iter().map(|t| t.to_string()).collect();
        tool
    }

    pub fn featured(mut tool: Tool) -> Tool {
        tool.featured = true;
        tool
    }

    pub fn review(slug: &str, rating: u8, created_at: DateTime<Utc>) -> Review {
        Review {
            tool_slug: slug.to_string(),
            rating,
            created_at,
            user_id: None,
            body: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_parses_camel_case_json() {
        let raw = r#"{
            "id": "1",
            "name": "GitHub Copilot",
            "slug": "github-copilot",
            "tagline": "Your AI pair programmer",
            "description": "Suggests code",
            "category": "AI Code Assistants",
            "group": "AI Coding & Developer Tools",
            "pricing": "paid",
            "websiteUrl": "https://github.com/features/copilot",
            "logoUrl": null,
            "tags": ["coding", "ai"],
            "bestFor": ["developers"],
            "platforms": ["VS Code"],
            "featured": true
        }"#;
        let tool: Tool = serde_json::from_str(raw).expect("valid tool json");
        assert_eq!(tool.pricing, Pricing::Paid);
        assert_eq!(tool.website_url, "https://github.com/features/copilot");
        assert_eq!(tool.best_for, vec!["developers"]);
        assert!(tool.featured);
        assert!(tool.product_hunt_url.is_none());
    }

    #[test]
    fn featured_defaults_to_false() {
        let raw = r#"{"id":"2","name":"Otter","slug":"otter","tagline":"t","description":"d",
            "category":"Meeting & Scheduling","group":"AI Productivity","pricing":"freemium",
            "websiteUrl":"https://otter.ai"}"#;
        let tool: Tool = serde_json::from_str(raw).expect("valid tool json");
        assert!(!tool.featured);
        assert!(tool.tags.is_empty());
    }

    #[test]
    fn pricing_parse_is_case_insensitive() {
        assert_eq!(Pricing::parse("Free"), Some(Pricing::Free));
        assert_eq!(Pricing::parse("enterprise"), None);
    }
}
