use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::web_search::SearchProvider;

// --- Params ---

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListToolsParams {
    /// Exact category name, e.g. "AI Code Assistants".
    pub category: Option<String>,
    /// Exact group name, e.g. "AI Productivity".
    pub group: Option<String>,
    /// One of "free", "freemium", "paid".
    pub pricing: Option<String>,
    /// Only featured tools when true.
    pub featured: Option<bool>,
    /// Case-insensitive substring over name, tagline, description, tags and category.
    pub query: Option<String>,
    /// Maximum number of tools to return (default: all).
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetToolParams {
    /// Tool slug such as "github-copilot".
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetCollectionParams {
    /// Collection slug such as "deep-work-dev-stack".
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchCatalogParams {
    /// Free-text query. Empty returns navigation shortcuts.
    pub query: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CompareToolsParams {
    /// Between one and three tool slugs.
    pub slugs: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DiscoverParams {
    /// Natural-language query, e.g. "best AI tools for meeting notes".
    pub query: String,
    /// "serper" (default) or "serpapi".
    pub provider: Option<SearchProvider>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetArticleParams {
    /// Article ID returned by `discover`.
    pub article_id: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct MatchArticleParams {
    pub title: String,
    pub snippet: String,
    pub url: String,
    /// Source domain; derived from the URL when omitted.
    pub source: Option<String>,
    /// Maximum number of tools (default: 6).
    pub max_results: Option<u32>,
    /// Minimum aggregate score (default: 1.5).
    pub min_score: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct LeaderboardParams {
    /// "all" (default), "week", "month" or "trending".
    pub time_filter: Option<String>,
    /// "score" (default), "rating", "reviews", "recency" or "name".
    pub sort: Option<String>,
    pub ascending: Option<bool>,
    pub category: Option<String>,
    pub group: Option<String>,
    /// Minimum review count (default: 1).
    pub min_reviews: Option<u32>,
    /// Maximum entries (default: 10, max: 100).
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SubmitReviewParams {
    pub tool_slug: String,
    /// Integer rating from 1 to 5.
    pub rating: u8,
    pub user_id: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct RecommendStackParams {
    /// "founder", "developer", "student", "creator" or "other".
    pub persona: String,
    /// Category names the user wants to focus on.
    #[serde(default)]
    pub focus_areas: Vec<String>,
    /// "free", "freemium-ok" or "paid-ok" (default).
    pub budget: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetStackParams {
    pub owner_id: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SaveStackParams {
    pub owner_id: String,
    pub tool_slugs: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StackAction {
    Add,
    Remove,
    Toggle,
    Clear,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ModifyStackParams {
    pub owner_id: String,
    pub action: StackAction,
    /// Required for add, remove and toggle.
    pub tool_slug: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SmartFiltersParams {
    pub query: String,
}

// --- Responses ---

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToolCard {
    pub slug: String,
    pub name: String,
    pub tagline: String,
    pub category: String,
    pub group: String,
    pub pricing: String,
    pub website_url: String,
    pub featured: bool,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToolDetail {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub category: String,
    pub group: String,
    pub pricing: String,
    pub website_url: String,
    pub product_hunt_url: Option<String>,
    pub logo_url: Option<String>,
    pub tags: Vec<String>,
    pub best_for: Vec<String>,
    pub platforms: Vec<String>,
    pub featured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToolListResponse {
    pub total: usize,
    pub tools: Vec<ToolCard>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReviewStats {
    pub avg_rating: f64,
    pub review_count: u32,
    pub last_review_at: Option<String>,
    /// Counts of rounded ratings 1 through 5.
    pub distribution: [u32; 5],
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToolDetailResponse {
    pub tool: ToolDetail,
    pub reviews: ReviewStats,
    pub related: Vec<ToolCard>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryInfo {
    pub name: String,
    pub group: String,
    pub tool_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CollectionInfo {
    pub slug: String,
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub persona: String,
    pub tags: Vec<String>,
    pub tool_count: usize,
    pub featured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CollectionListResponse {
    pub collections: Vec<CollectionInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CollectionDetailResponse {
    pub collection: CollectionInfo,
    pub tools: Vec<ToolCard>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PaletteItem {
    /// "tool", "collection", "category", "persona" or "action".
    pub kind: String,
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub url: String,
    pub badge: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchCatalogResponse {
    pub results: Vec<PaletteItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CompareToolsResponse {
    pub tools: Vec<ToolDetail>,
    pub reviews: Vec<ReviewStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ToolMatchInfo {
    pub tool: ToolCard,
    pub score: f64,
    /// "high", "medium" or "low".
    pub quality: String,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MatchArticleResponse {
    pub matches: Vec<ToolMatchInfo>,
    /// True when no tool cleared the threshold and featured tools were substituted.
    pub fallback: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SmartFilterInfo {
    /// "category", "pricing" or "tag".
    pub kind: String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SmartFiltersResponse {
    pub filters: Vec<SmartFilterInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DiscoveredArticle {
    pub article_id: String,
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub source: Option<String>,
    pub matched_tools: Vec<ToolMatchInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DiscoverResponse {
    pub query: String,
    pub search_terms: String,
    pub category: Option<String>,
    pub intent: String,
    pub provider: SearchProvider,
    pub cached: bool,
    pub articles: Vec<DiscoveredArticle>,
    pub filters: Vec<SmartFilterInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ArticleDetailResponse {
    pub article_id: String,
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub source: Option<String>,
    pub summary: String,
    pub matched_tools: Vec<ToolMatchInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BadgeInfo {
    pub label: String,
    pub variant: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub tool: ToolCard,
    pub avg_rating: f64,
    pub review_count: u32,
    pub last_review_at: Option<String>,
    pub bayesian_score: f64,
    pub final_score: f64,
    /// "up", "down", "stable" or "new".
    pub trend: String,
    pub trend_value: f64,
    pub badges: Vec<BadgeInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LeaderboardResponse {
    pub time_filter: String,
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LeaderboardHighlightsResponse {
    pub hidden_gems: Vec<LeaderboardEntry>,
    pub most_reviewed: Vec<LeaderboardEntry>,
    pub new_entries: Vec<LeaderboardEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SubmitReviewResponse {
    /// False when no review store is reachable.
    pub stored: bool,
    pub tool_slug: String,
    pub reviews: ReviewStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecommendedTool {
    pub tool: ToolCard,
    pub score: u32,
    /// Human-readable reasons, e.g. "Featured tool".
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RecommendStackResponse {
    pub tools: Vec<RecommendedTool>,
    pub markdown: String,
    pub default_collection: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StackResponse {
    pub owner_id: String,
    pub tools: Vec<ToolCard>,
    /// False when the stack could not be written to the store.
    pub persisted: bool,
    pub markdown: String,
}
