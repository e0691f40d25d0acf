/// MCP server for the FlowStacks AI tools directory.
///
/// Catalog tools:
/// - `list_tools`, `get_tool`, `list_categories`, `list_collections`,
///   `get_collection`, `search_catalog`, `compare_tools`
///
/// Discovery tools:
/// - `discover`, `get_article`, `match_article`, `smart_filters`
///
/// Reviews, leaderboard and stacks:
/// - `leaderboard`, `leaderboard_highlights`, `submit_review`,
///   `recommend_stack`, `get_stack`, `save_stack`, `modify_stack`
use std::sync::Arc;

use chrono::Utc;
use rmcp::{
    Json, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    tool, tool_handler, tool_router,
};
use tokio::sync::RwLock;
use tracing::info;

use crate::catalog::{Catalog, ToolFilter};
use crate::discovery::{ArticleCache, DiscoveryService};
use crate::error::AppError;
use crate::leaderboard::{
    build_leaderboard, hidden_gems, most_reviewed, new_entries, review_distribution, LeaderboardQuery,
    LeaderboardRow, SortBy, TimeFilter,
};
use crate::matcher::{match_tools, MatchOptions, ToolMatch};
use crate::model::{Article, Collection, Pricing, Review, Tool, ToolAggregate};
use crate::palette::{build_palette_index, search_palette, PaletteEntry};
use crate::query::{parse_natural_query, smart_filters, SmartFilter};
use crate::ranking::RankingOptions;
use crate::recommend::{default_collection_for_persona, recommend_tools, stack_markdown, Budget};
use crate::reviews::{aggregate_reviews, ReviewStore};
use crate::stacks::{SavedStack, StackStore};
use crate::summary::summarize_article;
use flowstacks_common::mcp_api::{
    ArticleDetailResponse, BadgeInfo, CategoryInfo, CategoryListResponse, CollectionDetailResponse,
    CollectionInfo, CollectionListResponse, CompareToolsParams, CompareToolsResponse, DiscoverParams,
    DiscoverResponse, DiscoveredArticle, GetArticleParams, GetCollectionParams, GetStackParams,
    GetToolParams, LeaderboardEntry, LeaderboardHighlightsResponse, LeaderboardParams,
    LeaderboardResponse, ListToolsParams, MatchArticleParams, MatchArticleResponse,
    ModifyStackParams, PaletteItem, RecommendStackParams, RecommendStackResponse, RecommendedTool,
    ReviewStats, SaveStackParams, SearchCatalogParams, SearchCatalogResponse, SmartFilterInfo,
    SmartFiltersParams, SmartFiltersResponse, StackResponse, SubmitReviewParams,
    SubmitReviewResponse, ToolCard, ToolDetail, ToolDetailResponse, ToolListResponse,
    ToolMatchInfo,
};

const MAX_COMPARE: usize = 3;
const RELATED_LIMIT: usize = 4;
const DEFAULT_LEADERBOARD_LIMIT: u32 = 10;
const MAX_LEADERBOARD_LIMIT: u32 = 100;

#[derive(Clone)]
pub struct FlowStacksServer {
    catalog: Arc<Catalog>,
    palette: Arc<Vec<PaletteEntry>>,
    reviews: ReviewStore,
    stacks: StackStore,
    discovery: Arc<DiscoveryService>,
    articles: Arc<RwLock<ArticleCache>>,
    ranking: RankingOptions,
    tool_router: ToolRouter<FlowStacksServer>,
}

impl FlowStacksServer {
    pub fn new(
        catalog: Arc<Catalog>,
        reviews: ReviewStore,
        stacks: StackStore,
        discovery: DiscoveryService,
    ) -> Self {
        let palette = Arc::new(build_palette_index(&catalog));
        Self {
            catalog,
            palette,
            reviews,
            stacks,
            discovery: Arc::new(discovery),
            articles: Arc::new(RwLock::new(ArticleCache::new())),
            ranking: RankingOptions::default(),
            tool_router: Self::tool_router(),
        }
    }

    fn tool(&self, slug: &str) -> Result<&Tool, String> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Err("slug must not be empty".to_string());
        }
        self.catalog
            .tool_by_slug(slug)
            .or_else(|| self.catalog.tool_by_id(slug))
            .ok_or_else(|| AppError::ToolNotFound(slug.to_string()).to_string())
    }

    async fn review_stats(&self, slug: &str) -> ReviewStats {
        let reviews = self.reviews.reviews_for(slug).await;
        review_stats(&reviews, slug)
    }

    fn stack_response(&self, owner_id: &str, saved: SavedStack) -> StackResponse {
        let tools = self.catalog.tools_by_slugs(&saved.tool_slugs);
        StackResponse {
            owner_id: owner_id.trim().to_string(),
            markdown: stack_markdown(&tools),
            tools: tools.into_iter().map(to_tool_card).collect(),
            persisted: saved.persisted,
        }
    }
}

#[tool_router]
impl FlowStacksServer {
    #[tool(description = "List catalog tools, optionally filtered by category, group, pricing ('free', 'freemium', 'paid'), featured flag or a text query.")]
    async fn list_tools(
        &self,
        Parameters(params): Parameters<ListToolsParams>,
    ) -> Result<Json<ToolListResponse>, String> {
        let pricing = match params.pricing.as_deref() {
            Some(p) => Some(Pricing::parse(p).ok_or_else(|| format!("unknown pricing: '{p}'"))?),
            None => None,
        };
        let filter = ToolFilter {
            category: params.category,
            group: params.group,
            pricing,
            featured_only: params.featured.unwrap_or(false),
            query: params.query.filter(|q| !q.trim().is_empty()),
        };

        let matched = self.catalog.filter(&filter);
        let total = matched.len();
        let limit = params.limit.map_or(total, |l| l as usize);
        let tools = matched.into_iter().take(limit).map(to_tool_card).collect();

        Ok(Json(ToolListResponse { total, tools }))
    }

    #[tool(description = "Get the full record of a tool by slug (e.g. 'github-copilot') or id, with its review summary and related tools.")]
    async fn get_tool(
        &self,
        Parameters(params): Parameters<GetToolParams>,
    ) -> Result<Json<ToolDetailResponse>, String> {
        let tool = self.tool(&params.slug)?;
        let reviews = self.review_stats(&tool.slug).await;
        let related = self
            .catalog
            .related_tools(tool, RELATED_LIMIT)
            .into_iter()
            .map(to_tool_card)
            .collect();

        Ok(Json(ToolDetailResponse {
            tool: to_tool_detail(tool),
            reviews,
            related,
        }))
    }

    #[tool(description = "List tool categories with their group and tool count.")]
    async fn list_categories(&self) -> Result<Json<CategoryListResponse>, String> {
        let categories = self
            .catalog
            .categories()
            .into_iter()
            .map(|c| CategoryInfo {
                name: c.name,
                group: c.group,
                tool_count: c.tool_count,
            })
            .collect();
        Ok(Json(CategoryListResponse { categories }))
    }

    #[tool(description = "List curated tool collections.")]
    async fn list_collections(&self) -> Result<Json<CollectionListResponse>, String> {
        let collections = self
            .catalog
            .collections()
            .iter()
            .map(|c| to_collection_info(&self.catalog, c))
            .collect();
        Ok(Json(CollectionListResponse { collections }))
    }

    #[tool(description = "Get a collection by slug (e.g. 'deep-work-dev-stack') or id, with its tools in curated order.")]
    async fn get_collection(
        &self,
        Parameters(params): Parameters<GetCollectionParams>,
    ) -> Result<Json<CollectionDetailResponse>, String> {
        let slug = params.slug.trim();
        let collection = self
            .catalog
            .collection_by_slug(slug)
            .or_else(|| self.catalog.collection_by_id(slug))
            .ok_or_else(|| AppError::CollectionNotFound(slug.to_string()).to_string())?;
        let tools = self
            .catalog
            .collection_tools(collection)
            .into_iter()
            .map(to_tool_card)
            .collect();

        Ok(Json(CollectionDetailResponse {
            collection: to_collection_info(&self.catalog, collection),
            tools,
        }))
    }

    #[tool(description = "Command-palette search over tools, collections, groups, personas and navigation actions. Returns at most 8 entries.")]
    async fn search_catalog(
        &self,
        Parameters(params): Parameters<SearchCatalogParams>,
    ) -> Result<Json<SearchCatalogResponse>, String> {
        let results = search_palette(&params.query, &self.palette)
            .into_iter()
            .map(|e| PaletteItem {
                kind: e.kind.as_str().to_string(),
                id: e.id.clone(),
                title: e.title.clone(),
                subtitle: e.subtitle.clone(),
                url: e.url.clone(),
                badge: e.badge.clone(),
            })
            .collect();
        Ok(Json(SearchCatalogResponse { results }))
    }

    #[tool(description = "Compare up to three tools side by side, including their review summaries.")]
    async fn compare_tools(
        &self,
        Parameters(params): Parameters<CompareToolsParams>,
    ) -> Result<Json<CompareToolsResponse>, String> {
        let mut slugs: Vec<&str> = Vec::new();
        for slug in params.slugs.iter().map(|s| s.trim()) {
            if !slugs.contains(&slug) {
                slugs.push(slug);
            }
        }
        if slugs.is_empty() {
            return Err("at least one slug is required".to_string());
        }
        if slugs.len() > MAX_COMPARE {
            return Err(format!("at most {MAX_COMPARE} tools can be compared"));
        }

        let mut tools = Vec::with_capacity(slugs.len());
        let mut reviews = Vec::with_capacity(slugs.len());
        for slug in slugs {
            let tool = self.tool(slug)?;
            tools.push(to_tool_detail(tool));
            reviews.push(self.review_stats(&tool.slug).await);
        }

        Ok(Json(CompareToolsResponse { tools, reviews }))
    }

    #[tool(description = "Search the web for articles about AI productivity tools and link each result to matching catalog tools. Requires SERPER_API_KEY or SERPAPI_API_KEY.")]
    async fn discover(
        &self,
        Parameters(params): Parameters<DiscoverParams>,
    ) -> Result<Json<DiscoverResponse>, String> {
        let query = params.query.trim().to_string();
        if query.is_empty() {
            return Err("query must not be empty".to_string());
        }

        let parsed = parse_natural_query(&query);
        let outcome = self
            .discovery
            .search(&parsed.search_terms, params.provider)
            .await
            .map_err(|e| format!("search failed: {e}"))?;

        let tools = self.catalog.tools();
        let options = MatchOptions::default();
        let mut articles = Vec::with_capacity(outcome.results.len());
        {
            let mut cache = self.articles.write().await;
            for result in outcome.results {
                let article = Article::from(result);
                let matched = match_tools(&article, tools, &options);
                let article_id = cache.add(article.clone());
                articles.push(DiscoveredArticle {
                    article_id,
                    title: article.title,
                    url: article.url,
                    snippet: article.snippet,
                    source: article.source,
                    matched_tools: matched.matches.iter().map(to_match_info).collect(),
                });
            }
        }
        let article_cache = self.articles.read().await.len();
        info!(
            query = %query,
            articles = articles.len(),
            cached = outcome.cached,
            article_cache,
            "discover complete"
        );

        Ok(Json(DiscoverResponse {
            filters: smart_filters(&query, tools).into_iter().map(to_filter_info).collect(),
            query,
            search_terms: parsed.search_terms,
            category: parsed.category.map(str::to_string),
            intent: parsed.intent.as_str().to_string(),
            provider: outcome.provider,
            cached: outcome.cached,
            articles,
        }))
    }

    #[tool(description = "Open an article returned by `discover`: summary plus matched tools. An empty article_id reopens the last article opened.")]
    async fn get_article(
        &self,
        Parameters(params): Parameters<GetArticleParams>,
    ) -> Result<Json<ArticleDetailResponse>, String> {
        let requested = params.article_id.trim();
        let (id, article) = {
            let mut cache = self.articles.write().await;
            let entry = if requested.is_empty() {
                cache
                    .current()
                    .ok_or_else(|| "no article has been opened yet".to_string())?
            } else {
                cache.set_current(requested);
                cache
                    .get(requested)
                    .ok_or_else(|| AppError::ArticleNotFound(requested.to_string()).to_string())?
            };
            (entry.id.clone(), entry.article.clone())
        };

        let matched = match_tools(&article, self.catalog.tools(), &MatchOptions::default());
        Ok(Json(ArticleDetailResponse {
            article_id: id,
            summary: summarize_article(&article),
            matched_tools: matched.matches.iter().map(to_match_info).collect(),
            title: article.title,
            url: article.url,
            snippet: article.snippet,
            source: article.source,
        }))
    }

    #[tool(description = "Score catalog tools against an article's title, snippet and source. Falls back to featured tools for generic 'best AI tools' listicles.")]
    async fn match_article(
        &self,
        Parameters(params): Parameters<MatchArticleParams>,
    ) -> Result<Json<MatchArticleResponse>, String> {
        let defaults = MatchOptions::default();
        let options = MatchOptions {
            max_results: params.max_results.map_or(defaults.max_results, |n| n as usize),
            min_score: params.min_score.unwrap_or(defaults.min_score),
        };
        let article = Article {
            title: params.title,
            snippet: params.snippet,
            url: params.url,
            source: params.source,
        };

        let outcome = match_tools(&article, self.catalog.tools(), &options);
        Ok(Json(MatchArticleResponse {
            matches: outcome.matches.iter().map(to_match_info).collect(),
            fallback: outcome.fallback,
        }))
    }

    #[tool(description = "Suggest category, pricing and tag filters for a search query.")]
    async fn smart_filters(
        &self,
        Parameters(params): Parameters<SmartFiltersParams>,
    ) -> Result<Json<SmartFiltersResponse>, String> {
        let filters = smart_filters(&params.query, self.catalog.tools())
            .into_iter()
            .map(to_filter_info)
            .collect();
        Ok(Json(SmartFiltersResponse { filters }))
    }

    #[tool(description = "Rank reviewed tools by Bayesian-smoothed rating plus a recency boost. Supports time windows ('all', 'week', 'month', 'trending'), sorting and category/group filters.")]
    async fn leaderboard(
        &self,
        Parameters(params): Parameters<LeaderboardParams>,
    ) -> Result<Json<LeaderboardResponse>, String> {
        let time_filter = match params.time_filter.as_deref() {
            Some(s) => TimeFilter::parse(s).ok_or_else(|| format!("unknown time_filter: '{s}'"))?,
            None => TimeFilter::All,
        };
        let sort_by = match params.sort.as_deref() {
            Some(s) => SortBy::parse(s).ok_or_else(|| format!("unknown sort: '{s}'"))?,
            None => SortBy::Score,
        };
        let query = LeaderboardQuery {
            time_filter,
            sort_by,
            ascending: params.ascending.unwrap_or(false),
            min_reviews: params.min_reviews,
            limit: Some(
                params
                    .limit
                    .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
                    .min(MAX_LEADERBOARD_LIMIT) as usize,
            ),
        };

        let reviews = self.reviews.all_reviews().await;
        let category = params.category.as_deref();
        let group = params.group.as_deref();
        let rows = build_leaderboard(
            self.catalog.tools(),
            &reviews,
            &query,
            |a| {
                category.map_or(true, |c| a.tool.category == c) && group.map_or(true, |g| a.tool.group == g)
            },
            &self.ranking,
            Utc::now(),
        );

        Ok(Json(LeaderboardResponse {
            time_filter: time_filter.as_str().to_string(),
            entries: rows.iter().map(to_leaderboard_entry).collect(),
        }))
    }

    #[tool(description = "Leaderboard highlights: hidden gems, most reviewed tools and new entries.")]
    async fn leaderboard_highlights(&self) -> Result<Json<LeaderboardHighlightsResponse>, String> {
        let reviews = self.reviews.all_reviews().await;
        let now = Utc::now();
        let rows = build_leaderboard(
            self.catalog.tools(),
            &reviews,
            &LeaderboardQuery::default(),
            |_| true,
            &self.ranking,
            now,
        );
        let scores: Vec<ToolAggregate<'_>> = rows.iter().map(|r| r.score.clone()).collect();

        Ok(Json(LeaderboardHighlightsResponse {
            hidden_gems: highlight_entries(&rows, &hidden_gems(&scores)),
            most_reviewed: highlight_entries(&rows, &most_reviewed(&scores)),
            new_entries: highlight_entries(&rows, &new_entries(&scores, now)),
        }))
    }

    #[tool(description = "Submit a 1-5 star review for a tool. Reviews persist in Redis when configured.")]
    async fn submit_review(
        &self,
        Parameters(params): Parameters<SubmitReviewParams>,
    ) -> Result<Json<SubmitReviewResponse>, String> {
        let slug = params.tool_slug.trim().to_string();
        let submitted = self
            .reviews
            .submit(&self.catalog, &slug, params.rating, params.user_id, params.body, Utc::now())
            .await
            .map_err(|e| e.to_string())?;
        info!(tool_slug = %slug, rating = params.rating, stored = submitted.stored, "review submitted");

        let mut reviews = self.reviews.reviews_for(&slug).await;
        if !submitted.stored {
            reviews.push(submitted.review);
        }

        Ok(Json(SubmitReviewResponse {
            stored: submitted.stored,
            reviews: review_stats(&reviews, &slug),
            tool_slug: slug,
        }))
    }

    #[tool(description = "Recommend a starter stack for a persona ('founder', 'developer', 'student', 'creator'), focus categories and budget ('free', 'freemium-ok', 'paid-ok').")]
    async fn recommend_stack(
        &self,
        Parameters(params): Parameters<RecommendStackParams>,
    ) -> Result<Json<RecommendStackResponse>, String> {
        let budget = match params.budget.as_deref() {
            Some(b) => Budget::parse(b).ok_or_else(|| format!("unknown budget: '{b}'"))?,
            None => Budget::default(),
        };
        let picks = recommend_tools(self.catalog.tools(), &params.persona, &params.focus_areas, budget);
        let tools: Vec<&Tool> = picks.iter().map(|r| r.tool).collect();

        Ok(Json(RecommendStackResponse {
            markdown: stack_markdown(&tools),
            tools: picks
                .into_iter()
                .map(|r| RecommendedTool {
                    tool: to_tool_card(r.tool),
                    score: r.score,
                    reasons: r.reasons,
                })
                .collect(),
            default_collection: default_collection_for_persona(&params.persona).map(str::to_string),
        }))
    }

    #[tool(description = "Get the saved tool stack for an owner id.")]
    async fn get_stack(
        &self,
        Parameters(params): Parameters<GetStackParams>,
    ) -> Result<Json<StackResponse>, String> {
        let saved = self.stacks.get(&params.owner_id).await.map_err(|e| e.to_string())?;
        Ok(Json(self.stack_response(&params.owner_id, saved)))
    }

    #[tool(description = "Replace the saved tool stack for an owner id. Unknown slugs are rejected; duplicates are dropped.")]
    async fn save_stack(
        &self,
        Parameters(params): Parameters<SaveStackParams>,
    ) -> Result<Json<StackResponse>, String> {
        let saved = self
            .stacks
            .save(&self.catalog, &params.owner_id, &params.tool_slugs)
            .await
            .map_err(|e| e.to_string())?;
        Ok(Json(self.stack_response(&params.owner_id, saved)))
    }

    #[tool(description = "Add, remove or toggle one tool in a saved stack, or clear it.")]
    async fn modify_stack(
        &self,
        Parameters(params): Parameters<ModifyStackParams>,
    ) -> Result<Json<StackResponse>, String> {
        let saved = self
            .stacks
            .modify(&self.catalog, &params.owner_id, params.action, params.tool_slug.as_deref())
            .await
            .map_err(|e| e.to_string())?;
        Ok(Json(self.stack_response(&params.owner_id, saved)))
    }
}

fn review_stats(reviews: &[Review], slug: &str) -> ReviewStats {
    let aggregate = aggregate_reviews(reviews.iter().filter(|r| r.tool_slug == slug))
        .into_iter()
        .next();
    ReviewStats {
        avg_rating: aggregate.as_ref().map_or(0.0, |a| a.avg_rating),
        review_count: aggregate.as_ref().map_or(0, |a| a.review_count),
        last_review_at: aggregate.and_then(|a| a.last_review_at),
        distribution: review_distribution(reviews, slug),
    }
}

fn to_tool_card(tool: &Tool) -> ToolCard {
    ToolCard {
        slug: tool.slug.clone(),
        name: tool.name.clone(),
        tagline: tool.tagline.clone(),
        category: tool.category.clone(),
        group: tool.group.clone(),
        pricing: tool.pricing.as_str().to_string(),
        website_url: tool.website_url.clone(),
        featured: tool.featured,
        tags: tool.tags.clone(),
    }
}

fn to_tool_detail(tool: &Tool) -> ToolDetail {
    ToolDetail {
        id: tool.id.clone(),
        slug: tool.slug.clone(),
        name: tool.name.clone(),
        tagline: tool.tagline.clone(),
        description: tool.description.clone(),
        category: tool.category.clone(),
        group: tool.group.clone(),
        pricing: tool.pricing.as_str().to_string(),
        website_url: tool.website_url.clone(),
        product_hunt_url: tool.product_hunt_url.clone(),
        logo_url: tool.logo_url.clone(),
        tags: tool.tags.clone(),
        best_for: tool.best_for.clone(),
        platforms: tool.platforms.clone(),
        featured: tool.featured,
    }
}

fn to_collection_info(catalog: &Catalog, collection: &Collection) -> CollectionInfo {
    CollectionInfo {
        slug: collection.slug.clone(),
        name: collection.name.clone(),
        tagline: collection.tagline.clone(),
        description: collection.description.clone(),
        persona: collection.persona.clone(),
        tags: collection.tags.clone(),
        tool_count: catalog.collection_tools(collection).len(),
        featured: collection.featured,
    }
}

fn to_match_info(m: &ToolMatch<'_>) -> ToolMatchInfo {
    ToolMatchInfo {
        tool: to_tool_card(m.tool),
        score: m.score,
        quality: m.quality().as_str().to_string(),
        reasons: m.reasons.clone(),
    }
}

fn to_filter_info(f: SmartFilter) -> SmartFilterInfo {
    SmartFilterInfo {
        kind: f.kind.as_str().to_string(),
        label: f.label,
        value: f.value,
    }
}

fn to_leaderboard_entry(row: &LeaderboardRow<'_>) -> LeaderboardEntry {
    let s = &row.score;
    LeaderboardEntry {
        rank: row.rank,
        tool: to_tool_card(s.tool),
        avg_rating: round2(s.avg_rating),
        review_count: s.review_count,
        last_review_at: s.last_review_at.map(|t| t.to_rfc3339()),
        bayesian_score: round2(s.bayesian_score),
        final_score: round2(s.final_score),
        trend: row.trend.as_str().to_string(),
        trend_value: round2(row.trend_value),
        badges: row
            .badges
            .iter()
            .map(|b| BadgeInfo {
                label: b.label.to_string(),
                variant: b.variant.to_string(),
                icon: b.icon.to_string(),
            })
            .collect(),
    }
}

/// Leaderboard rows for `selected`, re-ranked from 1 in selection order.
fn highlight_entries(rows: &[LeaderboardRow<'_>], selected: &[ToolAggregate<'_>]) -> Vec<LeaderboardEntry> {
    selected
        .iter()
        .filter_map(|s| rows.iter().find(|r| r.score.tool.slug == s.tool.slug))
        .enumerate()
        .map(|(i, row)| LeaderboardEntry {
            rank: i + 1,
            ..to_leaderboard_entry(row)
        })
        .collect()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[tool_handler]
impl ServerHandler for FlowStacksServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: "flowstacks-directory".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "FlowStacks AI tools directory. Browse the catalog with list_tools, \
                 get_tool and the collection tools; search_catalog for quick lookup; \
                 discover to find web articles linked to catalog tools; leaderboard \
                 for review-based rankings; recommend_stack and the stack tools to \
                 build a personal tool stack."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use flowstacks_common::mcp_api::StackAction;
    use flowstacks_common::redis::RedisCache;
    use flowstacks_common::web_search::{SearchProvider, WebSearchClient, WebSearchConfig};

    use super::*;
    use crate::cache::SearchCache;
    use crate::model::fixtures::{featured, review, tool, with_tags};

    fn test_server() -> FlowStacksServer {
        let catalog = Catalog::from_parts(
            vec![
                featured(with_tags(tool("github-copilot", "GitHub Copilot", "AI Code Assistants"), &["coding"])),
                with_tags(tool("cursor", "Cursor", "AI Code Assistants"), &["coding", "editor"]),
                tool("otter-ai", "Otter.ai", "Meeting & Scheduling"),
            ],
            Vec::new(),
        )
        .expect("valid catalog");
        let now = Utc::now();
        let seed = vec![
            review("cursor", 5, now - Duration::days(1)),
            review("cursor", 4, now - Duration::days(30)),
            review("otter-ai", 3, now - Duration::days(3)),
        ];
        let config = WebSearchConfig {
            serper_api_key: None,
            serpapi_api_key: None,
            ..WebSearchConfig::from_env()
        };
        let client = WebSearchClient::new(config).expect("client builds");
        FlowStacksServer::new(
            Arc::new(catalog),
            ReviewStore::new(RedisCache::disabled(), seed),
            StackStore::new(RedisCache::disabled()),
            DiscoveryService::new(client, SearchCache::new(RedisCache::disabled())),
        )
    }

    #[test]
    fn tools_publish_output_schemas() {
        let tools = FlowStacksServer::tool_router().list_all();
        for name in [
            "list_tools",
            "get_tool",
            "list_categories",
            "list_collections",
            "get_collection",
            "search_catalog",
            "compare_tools",
            "discover",
            "get_article",
            "match_article",
            "smart_filters",
            "leaderboard",
            "leaderboard_highlights",
            "submit_review",
            "recommend_stack",
            "get_stack",
            "save_stack",
            "modify_stack",
        ] {
            let tool = tools
                .iter()
                .find(|t| t.name == name)
                .unwrap_or_else(|| panic!("missing tool: {name}"));
            assert!(
                tool.output_schema.is_some(),
                "tool {name} should publish output_schema"
            );
        }
    }

    #[test]
    fn review_stats_summarize_one_tool() {
        let now = Utc::now();
        let reviews = vec![
            review("cursor", 5, now - Duration::days(2)),
            review("cursor", 4, now),
            review("otter", 1, now),
        ];
        let stats = review_stats(&reviews, "cursor");
        assert_eq!(stats.review_count, 2);
        assert!((stats.avg_rating - 4.5).abs() < 1e-9);
        assert_eq!(stats.distribution, [0, 0, 0, 1, 1]);
        assert_eq!(stats.last_review_at, Some(now.to_rfc3339()));

        let empty = review_stats(&reviews, "missing");
        assert_eq!(empty.review_count, 0);
        assert!(empty.last_review_at.is_none());
    }

    #[tokio::test]
    async fn get_tool_includes_reviews_and_related() {
        let server = test_server();
        let Json(detail) = server
            .get_tool(Parameters(GetToolParams {
                slug: " cursor ".to_string(),
            }))
            .await
            .expect("tool exists");
        assert_eq!(detail.tool.slug, "cursor");
        assert_eq!(detail.reviews.review_count, 2);
        assert_eq!(detail.related.len(), 1);
        assert_eq!(detail.related[0].slug, "github-copilot");

        let err = server
            .get_tool(Parameters(GetToolParams {
                slug: "missing".to_string(),
            }))
            .await
            .err()
            .expect("request rejected");
        assert_eq!(err, "tool not found: missing");
    }

    #[tokio::test]
    async fn compare_rejects_more_than_three() {
        let server = test_server();
        let slugs = ["cursor", "otter-ai", "github-copilot", "x"].map(String::from).to_vec();
        let err = server
            .compare_tools(Parameters(CompareToolsParams { slugs }))
            .await
            .err()
            .expect("request rejected");
        assert!(err.contains("at most 3"));

        let slugs = ["cursor", "cursor", "otter-ai"].map(String::from).to_vec();
        let Json(cmp) = server
            .compare_tools(Parameters(CompareToolsParams { slugs }))
            .await
            .expect("valid comparison");
        assert_eq!(cmp.tools.len(), 2);
        assert_eq!(cmp.reviews[1].review_count, 1);
    }

    #[tokio::test]
    async fn leaderboard_ranks_seeded_reviews() {
        let server = test_server();
        let Json(board) = server
            .leaderboard(Parameters(LeaderboardParams::default()))
            .await
            .expect("leaderboard builds");
        assert_eq!(board.time_filter, "all");
        assert_eq!(board.entries.len(), 2);
        assert_eq!(board.entries[0].tool.slug, "cursor");
        assert_eq!(board.entries[0].rank, 1);

        let err = server
            .leaderboard(Parameters(LeaderboardParams {
                time_filter: Some("decade".to_string()),
                ..Default::default()
            }))
            .await
            .err()
            .expect("request rejected");
        assert!(err.contains("decade"));
    }

    #[tokio::test]
    async fn review_without_store_is_reflected_in_stats() {
        let server = test_server();
        let Json(resp) = server
            .submit_review(Parameters(SubmitReviewParams {
                tool_slug: "otter-ai".to_string(),
                rating: 5,
                user_id: None,
                body: None,
            }))
            .await
            .expect("valid review");
        assert!(!resp.stored);
        assert_eq!(resp.reviews.review_count, 2);
        assert_eq!(resp.reviews.distribution, [0, 0, 1, 0, 1]);

        let err = server
            .submit_review(Parameters(SubmitReviewParams {
                tool_slug: "otter-ai".to_string(),
                rating: 6,
                user_id: None,
                body: None,
            }))
            .await
            .err()
            .expect("request rejected");
        assert!(err.contains("rating"));
    }

    #[tokio::test]
    async fn unknown_article_is_reported() {
        let server = test_server();
        let err = server
            .get_article(Parameters(GetArticleParams {
                article_id: "article_0000".to_string(),
            }))
            .await
            .err()
            .expect("request rejected");
        assert_eq!(err, "article not found: article_0000");

        let err = server
            .get_article(Parameters(GetArticleParams {
                article_id: String::new(),
            }))
            .await
            .err()
            .expect("request rejected");
        assert!(err.contains("no article"));
    }

    #[tokio::test]
    async fn opened_article_becomes_current() {
        let server = test_server();
        let id = server.articles.write().await.add(Article {
            title: "Best GitHub Copilot Alternatives for 2024".to_string(),
            snippet: "Coding assistants compared.".to_string(),
            url: "https://example.com/copilot-alternatives".to_string(),
            source: None,
        });

        let Json(opened) = server
            .get_article(Parameters(GetArticleParams { article_id: id.clone() }))
            .await
            .expect("article cached");
        assert_eq!(opened.article_id, id);
        assert_eq!(opened.matched_tools[0].tool.slug, "github-copilot");
        assert!(opened.summary.starts_with("This article"));

        let Json(again) = server
            .get_article(Parameters(GetArticleParams { article_id: " ".to_string() }))
            .await
            .expect("current article");
        assert_eq!(again.article_id, id);
    }

    fn assert_send<T: Send>(_: &T) {}

    #[tokio::test]
    async fn discover_without_search_key() {
        let server = test_server();
        let params = DiscoverParams {
            query: "best ai tools for meetings".to_string(),
            provider: Some(SearchProvider::Serpapi),
        };
        let pending = server.discover(Parameters(params));
        assert_send(&pending);
        let err = pending.await.err().expect("request rejected");
        assert!(err.contains("SERPER_API_KEY"), "{err}");
        assert_eq!(server.articles.read().await.len(), 0);
    }

    #[tokio::test]
    async fn recommend_stack_explains_each_pick() {
        let server = test_server();
        let Json(resp) = server
            .recommend_stack(Parameters(RecommendStackParams {
                persona: "developer".to_string(),
                focus_areas: vec!["AI Code Assistants".to_string()],
                budget: None,
            }))
            .await
            .expect("recommendations");
        let slugs: Vec<&str> = resp.tools.iter().map(|r| r.tool.slug.as_str()).collect();
        assert_eq!(slugs, vec!["github-copilot", "cursor", "otter-ai"]);
        assert_eq!(resp.tools[0].score, 3);
        assert_eq!(
            resp.tools[0].reasons,
            vec!["Matches AI Code Assistants focus", "Featured tool"]
        );
        assert_eq!(resp.tools[1].reasons, vec!["Matches AI Code Assistants focus"]);
        assert!(resp.tools[2].reasons.is_empty());
        assert!(resp.markdown.contains("GitHub Copilot"));
    }

    #[tokio::test]
    async fn modify_stack_without_store() {
        let server = test_server();
        let Json(stack) = server
            .modify_stack(Parameters(ModifyStackParams {
                owner_id: "user-1".to_string(),
                action: StackAction::Add,
                tool_slug: Some("cursor".to_string()),
            }))
            .await
            .expect("valid action");
        assert!(!stack.persisted);
        assert_eq!(stack.tools.len(), 1);
        assert!(stack.markdown.contains("[Cursor]"));

        let Json(read) = server
            .get_stack(Parameters(GetStackParams {
                owner_id: "user-1".to_string(),
            }))
            .await
            .expect("valid owner");
        assert!(!read.persisted);
        assert!(read.tools.is_empty());
    }

    #[tokio::test]
    async fn list_tools_ignores_surrounding_whitespace() {
        let server = test_server();
        let Json(list) = server
            .list_tools(Parameters(ListToolsParams {
                query: Some(" cursor ".to_string()),
                ..Default::default()
            }))
            .await
            .expect("valid filter");
        assert_eq!(list.total, 1);
        assert_eq!(list.tools[0].slug, "cursor");
    }

    #[test]
    fn rounding() {
        assert_eq!(round2(4.545_454), 4.55);
        assert_eq!(round2(4.0), 4.0);
    }
}
