//! Links web-search articles back to catalog tools.
//!
//! Each tool gets an additive relevance score from case-insensitive substring
//! signals over the article title and snippet:
//!
//! | signal                                   | weight          |
//! |------------------------------------------|-----------------|
//! | name in title                            | +5              |
//! | name in snippet                          | +3              |
//! | slug in title or snippet                 | +2              |
//! | matching tag (first 3 only)              | +1 each         |
//! | category name in text                    | +1              |
//! | category keyword + "tool"/"best"/"top"   | +2 (+1 featured)|
//! | category keyword alone                   | +1              |
//! | source domain owns the tool's brand      | +2              |
//! | a name word longer than 4 chars          | +0.5            |
use flowstacks_common::web_search::domain_of;

use crate::model::{Article, Tool};

pub const DEFAULT_MAX_RESULTS: usize = 6;
pub const DEFAULT_MIN_SCORE: f64 = 1.5;

const MAX_TAG_MATCHES: usize = 3;
const NEAR_TIE: f64 = 0.1;

/// Keywords implying an article is about tools of a category.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Development Tools",
        &["coding", "developer", "programming", "code", "github", "git", "ide", "editor", "assistant"],
    ),
    (
        "Writing & Communication",
        &["writing", "write", "email", "communication", "content", "blog", "grammar"],
    ),
    (
        "Meeting & Scheduling",
        &["meeting", "schedule", "calendar", "video call", "zoom", "conference"],
    ),
    (
        "Automation & Workflows",
        &["automation", "workflow", "integrate", "zapier", "automate"],
    ),
    (
        "Planning & Management",
        &["planning", "project", "management", "task", "organize", "productivity"],
    ),
    (
        "Research & Analysis",
        &["research", "analyze", "data", "insight", "analytics"],
    ),
];

/// Keywords used to pick the dominant category of a listicle with no direct hits.
const CATEGORY_PATTERNS: &[(&str, &[&str])] = &[
    (
        "Development Tools",
        &["coding", "code", "developer", "programming", "github", "copilot"],
    ),
    (
        "Writing & Communication",
        &["writing", "content", "grammar", "email", "copywriting"],
    ),
    (
        "Meeting & Scheduling",
        &["meeting", "video", "conference", "schedule", "calendar"],
    ),
    (
        "Planning & Management",
        &["project", "management", "task", "planning", "productivity"],
    ),
    (
        "Research & Analysis",
        &["research", "analysis", "data", "analytics"],
    ),
    (
        "Automation & Workflows",
        &["automation", "workflow", "zapier", "integration"],
    ),
];

/// Source domain fragment -> slugs of the tools that brand owns.
const BRAND_HINTS: &[(&str, &[&str])] = &[
    ("github", &["github-copilot", "copilot"]),
    ("openai", &["chatgpt", "gpt", "dall-e", "whisper"]),
    ("anthropic", &["claude"]),
    ("google", &["gemini", "bard"]),
    ("notion", &["notion", "notion-ai"]),
    ("grammarly", &["grammarly"]),
    ("jasper", &["jasper"]),
    ("cursor", &["cursor"]),
    ("midjourney", &["midjourney"]),
    ("runway", &["runway", "runway-ml"]),
    ("zapier", &["zapier"]),
    ("perplexity", &["perplexity"]),
    ("otter", &["otter", "otter-ai"]),
    ("fireflies", &["fireflies"]),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    pub max_results: usize,
    pub min_score: f64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchQuality {
    High,
    Medium,
    Low,
}

impl MatchQuality {
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            Self::High
        } else if score >= 5.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolMatch<'a> {
    pub tool: &'a Tool,
    pub score: f64,
    pub reasons: Vec<String>,
}

impl ToolMatch<'_> {
    pub fn quality(&self) -> MatchQuality {
        MatchQuality::from_score(self.score)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatchOutcome<'a> {
    pub matches: Vec<ToolMatch<'a>>,
    /// Set when nothing cleared the threshold and featured tools were substituted.
    pub fallback: bool,
}

/// Lowercased views of an article, computed once per match call.
struct ArticleText {
    title: String,
    snippet: String,
    combined: String,
    source_domain: String,
}

impl ArticleText {
    fn new(article: &Article) -> Self {
        let title = article.title.to_lowercase();
        let snippet = article.snippet.to_lowercase();
        let combined = format!("{title} {snippet}");
        let source_domain = article
            .source
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
            .or_else(|| domain_of(&article.url))
            .unwrap_or_default();
        Self {
            title,
            snippet,
            combined,
            source_domain,
        }
    }

    fn has_listicle_qualifier(&self) -> bool {
        ["tool", "best", "top"].iter().any(|q| self.combined.contains(q))
    }
}

/// Return the tools an article most likely talks about, best first.
pub fn match_tools<'a>(article: &Article, tools: &'a [Tool], options: &MatchOptions) -> MatchOutcome<'a> {
    let text = ArticleText::new(article);

    let mut scored: Vec<ToolMatch<'a>> = tools
        .iter()
        .filter_map(|tool| {
            let (score, reasons) = score_tool_text(tool, &text);
            (score > 0.0).then_some(ToolMatch {
                tool,
                score,
                reasons,
            })
        })
        .filter(|m| m.score >= options.min_score)
        .collect();

    if scored.is_empty() {
        if is_generic_listicle(&text.combined) {
            return MatchOutcome {
                matches: featured_fallback(tools, &text, options.max_results),
                fallback: true,
            };
        }
        return MatchOutcome::default();
    }

    scored.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.tool.featured.cmp(&a.tool.featured))
    });
    promote_featured_near_ties(&mut scored);
    scored.truncate(options.max_results);

    MatchOutcome {
        matches: scored,
        fallback: false,
    }
}

/// Relevance score of `tool` and the signals that contributed.
fn score_tool_text(tool: &Tool, text: &ArticleText) -> (f64, Vec<String>) {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    let name = tool.name.to_lowercase();
    let slug = tool.slug.to_lowercase();

    if !name.is_empty() {
        if text.title.contains(&name) {
            score += 5.0;
            reasons.push("name in title".to_string());
        }
        if text.snippet.contains(&name) {
            score += 3.0;
            reasons.push("name in snippet".to_string());
        }
    }

    if !slug.is_empty() && text.combined.contains(&slug) {
        score += 2.0;
        reasons.push("slug match".to_string());
    }

    let tag_matches = tool
        .tags
        .iter()
        .map(|t| t.to_lowercase())
        .filter(|t| !t.is_empty() && text.combined.contains(t.as_str()))
        .take(MAX_TAG_MATCHES)
        .count();
    if tag_matches > 0 {
        score += tag_matches as f64;
        let plural = if tag_matches > 1 { "es" } else { "" };
        reasons.push(format!("{tag_matches} tag match{plural}"));
    }

    let category = tool.category.to_lowercase();
    if !category.is_empty() && text.combined.contains(&category) {
        score += 1.0;
        reasons.push("category hint".to_string());
    }

    let keyword_hit = category_keywords(&tool.category)
        .iter()
        .any(|kw| text.combined.contains(kw));
    if keyword_hit {
        if text.has_listicle_qualifier() {
            score += 2.0;
            if tool.featured {
                score += 1.0;
            }
            reasons.push("category match".to_string());
        } else {
            score += 1.0;
        }
    }

    if let Some(domain) = brand_domain_for(&text.source_domain, &slug) {
        score += 2.0;
        reasons.push(format!("domain hint: {domain}"));
    }

    let partial = name
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|w| w.chars().count() > 4)
        .any(|w| text.combined.contains(w));
    if partial {
        score += 0.5;
    }

    (score, reasons)
}

fn category_keywords(category: &str) -> &'static [&'static str] {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, kws)| *kws)
        .unwrap_or(&[])
}

/// First brand domain present in `source_domain` whose hint list covers `slug`.
fn brand_domain_for(source_domain: &str, slug: &str) -> Option<&'static str> {
    if source_domain.is_empty() || slug.is_empty() {
        return None;
    }
    BRAND_HINTS
        .iter()
        .filter(|(domain, _)| source_domain.contains(domain))
        .find(|(_, slugs)| slugs.iter().any(|s| slug.contains(s) || s.contains(slug)))
        .map(|(domain, _)| *domain)
}

fn is_generic_listicle(combined: &str) -> bool {
    ["ai tool", "best", "top"].iter().any(|q| combined.contains(q))
}

/// Category whose pattern list has the most hits in `text`; first wins ties.
pub fn detect_article_category(text: &str) -> Option<&'static str> {
    let text = text.to_lowercase();
    let mut best: Option<(&'static str, usize)> = None;
    for (category, keywords) in CATEGORY_PATTERNS {
        let hits = keywords.iter().filter(|kw| text.contains(*kw)).count();
        if hits > best.map_or(0, |(_, n)| n) {
            best = Some((category, hits));
        }
    }
    best.map(|(category, _)| category)
}

fn featured_fallback<'a>(tools: &'a [Tool], text: &ArticleText, max_results: usize) -> Vec<ToolMatch<'a>> {
    let as_match = |tool: &'a Tool, reason: String| {
        let (score, _) = score_tool_text(tool, text);
        ToolMatch {
            tool,
            score,
            reasons: vec![reason],
        }
    };

    if let Some(category) = detect_article_category(&text.combined) {
        let in_category: Vec<ToolMatch<'a>> = tools
            .iter()
            .filter(|t| t.featured && t.category == category)
            .take(max_results)
            .map(|t| as_match(t, format!("featured in {category}")))
            .collect();
        if !in_category.is_empty() {
            return in_category;
        }
    }

    tools
        .iter()
        .filter(|t| t.featured)
        .take(max_results)
        .map(|t| as_match(t, "featured tool".to_string()))
        .collect()
}

/// Within a 0.1 score band, featured tools move ahead of non-featured ones.
fn promote_featured_near_ties(scored: &mut [ToolMatch<'_>]) {
    for i in 1..scored.len() {
        let mut j = i;
        while j > 0
            && scored[j].tool.featured
            && !scored[j - 1].tool.featured
            && scored[j - 1].score - scored[j].score < NEAR_TIE
        {
            scored.swap(j - 1, j);
            j -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{featured, tool, with_tags};

    fn article(title: &str, snippet: &str, url: &str) -> Article {
        Article {
            title: title.to_string(),
            snippet: snippet.to_string(),
            url: url.to_string(),
            source: None,
        }
    }

    fn catalog() -> Vec<Tool> {
        vec![
            featured(with_tags(
                tool("github-copilot", "GitHub Copilot", "Development Tools"),
                &["coding", "ai"],
            )),
            with_tags(tool("cursor", "Cursor", "Development Tools"), &["editor", "coding"]),
            featured(with_tags(
                tool("otter-ai", "Otter.ai", "Meeting & Scheduling"),
                &["transcription", "meetings"],
            )),
            with_tags(tool("zapier", "Zapier", "Automation & Workflows"), &["automation"]),
            featured(tool("notion-ai", "Notion AI", "Planning & Management")),
        ]
    }

    #[test]
    fn copilot_alternatives_article() {
        let tools = catalog();
        let a = article(
            "Best GitHub Copilot Alternatives for 2024",
            "We compare github-copilot with other coding assistants.",
            "https://example.com/copilot-alternatives",
        );
        let (score, reasons) = score_tool_text(&tools[0], &ArticleText::new(&a));
        assert!(score >= 7.0, "score was {score}");
        assert!(reasons.contains(&"name in title".to_string()));
        assert!(reasons.contains(&"slug match".to_string()));

        let outcome = match_tools(&a, &tools, &MatchOptions::default());
        assert!(!outcome.fallback);
        assert_eq!(outcome.matches[0].tool.slug, "github-copilot");
    }

    #[test]
    fn name_in_title_scores_at_least_five() {
        let tools = catalog();
        for t in &tools {
            let a = article(&format!("Why I switched to {}", t.name.to_uppercase()), "", "not a url");
            let (score, _) = score_tool_text(t, &ArticleText::new(&a));
            assert!(score >= 5.0, "{} scored {score}", t.slug);
        }
    }

    #[test]
    fn results_respect_threshold_and_limit() {
        let tools: Vec<Tool> = (0..20)
            .map(|i| with_tags(tool(&format!("writer-{i}"), &format!("Writer {i}"), "Writing & Communication"), &["writing"]))
            .collect();
        let a = article("Top writing tools", "Write better email and blog content", "https://x.dev");
        let options = MatchOptions {
            max_results: 4,
            min_score: 1.5,
        };
        let outcome = match_tools(&a, &tools, &options);
        assert_eq!(outcome.matches.len(), 4);
        for m in &outcome.matches {
            assert!(m.score >= 1.5);
        }
    }

    #[test]
    fn ordering_descends_with_featured_near_ties_first() {
        let tools = vec![
            with_tags(tool("alpha", "Alpha", "Research & Analysis"), &["research"]),
            featured(with_tags(tool("beta", "Beta", "Research & Analysis"), &["research"])),
            tool("gamma-suite", "Gamma Suite", "Research & Analysis"),
        ];
        let a = article(
            "Gamma Suite and research tools",
            "data insight for research teams",
            "https://news.example.com",
        );
        let outcome = match_tools(&a, &tools, &MatchOptions::default());
        let slugs: Vec<&str> = outcome.matches.iter().map(|m| m.tool.slug.as_str()).collect();
        assert_eq!(slugs[0], "gamma-suite");
        let beta = slugs.iter().position(|s| *s == "beta").expect("beta matched");
        let alpha = slugs.iter().position(|s| *s == "alpha").expect("alpha matched");
        assert!(beta < alpha);

        for pair in outcome.matches.windows(2) {
            assert!(pair[0].score + NEAR_TIE > pair[1].score);
        }
    }

    #[test]
    fn tag_bonus_capped_at_three() {
        let t = with_tags(
            tool("multi", "Zz", "Other"),
            &["alpha", "bravo", "charlie", "delta", "echo"],
        );
        let a = article("alpha bravo charlie delta echo", "", "https://x.dev");
        let (score, reasons) = score_tool_text(&t, &ArticleText::new(&a));
        assert_eq!(score, 3.0);
        assert_eq!(reasons, vec!["3 tag matches".to_string()]);
    }

    #[test]
    fn unqualified_category_keyword_is_halved() {
        let t = tool("calendly-ish", "Slotter", "Meeting & Scheduling");
        let plain = article("Rethinking the calendar", "", "https://x.dev");
        let qualified = article("Rethinking the calendar tool", "", "https://x.dev");
        assert_eq!(score_tool_text(&t, &ArticleText::new(&plain)).0, 1.0);
        assert_eq!(score_tool_text(&t, &ArticleText::new(&qualified)).0, 2.0);
        assert_eq!(score_tool_text(&featured(t), &ArticleText::new(&qualified)).0, 3.0);
    }

    #[test]
    fn brand_hint_from_source_or_url() {
        let t = tool("github-copilot", "Zz", "Other");
        let mut a = article("Release notes", "", "https://www.github.blog/changelog");
        assert_eq!(score_tool_text(&t, &ArticleText::new(&a)).0, 2.0);

        a.source = Some("GitHub.com".to_string());
        a.url = "garbage".to_string();
        let (score, reasons) = score_tool_text(&t, &ArticleText::new(&a));
        assert_eq!(score, 2.0);
        assert_eq!(reasons, vec!["domain hint: github".to_string()]);
    }

    #[test]
    fn malformed_url_means_no_brand_hint() {
        let t = tool("cursor", "Zz", "Other");
        let a = article("Release notes", "", "::::not a url");
        assert_eq!(score_tool_text(&t, &ArticleText::new(&a)).0, 0.0);
    }

    #[test]
    fn partial_word_counts_once() {
        let t = tool("perplexity-pro", "Perplexity Search Pro", "Other");
        let a = article("search engines like perplexity", "", "https://x.dev");
        assert_eq!(score_tool_text(&t, &ArticleText::new(&a)).0, 0.5);
    }

    #[test]
    fn listicle_falls_back_to_featured_in_detected_category() {
        let tools = catalog();
        let a = article(
            "The best apps for meeting notes",
            "Video conference recording made simple",
            "https://x.dev",
        );
        let options = MatchOptions {
            max_results: 6,
            min_score: 50.0,
        };
        let outcome = match_tools(&a, &tools, &options);
        assert!(outcome.fallback);
        assert_eq!(outcome.matches.iter().map(|m| m.tool.slug.as_str()).collect::<Vec<_>>(), vec!["otter-ai"]);
    }

    #[test]
    fn listicle_without_category_falls_back_to_any_featured() {
        let tools = catalog();
        let a = article("Top picks of the year", "", "https://x.dev");
        let options = MatchOptions {
            max_results: 2,
            min_score: 50.0,
        };
        let outcome = match_tools(&a, &tools, &options);
        assert!(outcome.fallback);
        let slugs: Vec<&str> = outcome.matches.iter().map(|m| m.tool.slug.as_str()).collect();
        assert_eq!(slugs, vec!["github-copilot", "otter-ai"]);
    }

    #[test]
    fn unrelated_article_matches_nothing() {
        let tools = catalog();
        let a = article("Gardening in spring", "Planting tulips", "https://x.dev");
        let outcome = match_tools(&a, &tools, &MatchOptions::default());
        assert!(outcome.matches.is_empty());
        assert!(!outcome.fallback);
    }

    #[test]
    fn empty_catalog_is_empty_result() {
        let a = article("Best AI tools", "", "https://x.dev");
        let outcome = match_tools(&a, &[], &MatchOptions::default());
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn detects_dominant_category() {
        assert_eq!(
            detect_article_category("project management and task planning with video"),
            Some("Planning & Management")
        );
        assert_eq!(detect_article_category("nothing relevant"), None);
    }

    #[test]
    fn quality_bands() {
        assert_eq!(MatchQuality::from_score(8.0), MatchQuality::High);
        assert_eq!(MatchQuality::from_score(5.5), MatchQuality::Medium);
        assert_eq!(MatchQuality::from_score(1.5), MatchQuality::Low);
    }
}
