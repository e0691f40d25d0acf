//! Offline article summaries built from the title, snippet and source.
use std::sync::LazyLock;

use flowstacks_common::web_search::domain_of;
use regex::Regex;

use crate::model::Article;

const SNIPPET_MAX_CHARS: usize = 150;
const MIN_SENTENCE_CHARS: usize = 50;
const DEFAULT_TOPIC: &str = "AI tools and technologies";

static LISTICLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\d+\s+(best|top|essential|must-have)").expect("valid regex")
});

const TOPIC_PATTERNS: &[(&str, &[&str])] = &[
    (
        "AI coding tools and assistants",
        &["coding", "code", "developer", "programming", "ide", "copilot"],
    ),
    (
        "AI productivity software",
        &["productivity", "workflow", "automation", "efficiency"],
    ),
    (
        "AI writing and content tools",
        &["writing", "content", "copywriting", "grammar", "editor"],
    ),
    (
        "AI meeting and communication tools",
        &["meeting", "video", "transcription", "call", "conference"],
    ),
    (
        "AI image generation and design",
        &["image", "design", "art", "visual", "graphic", "photo"],
    ),
    (
        "AI research and analysis tools",
        &["research", "analysis", "data", "analytics", "insight"],
    ),
    (
        "AI project management",
        &["project", "management", "planning", "task", "organization"],
    ),
];

const TECH_BLOGS: &[&str] = &["techcrunch", "theverge", "wired", "arstechnica", "zdnet", "cnet"];
const NEWS_SITES: &[&str] = &["bbc", "cnn", "reuters", "bloomberg", "forbes"];
const OFFICIAL_SOURCES: &[&str] = &[".ai", "openai", "anthropic", "google", "microsoft", "github"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Listicle,
    Review,
    Guide,
    Comparison,
    Article,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    TechBlog,
    News,
    Official,
    General,
}

pub fn detect_topic(title: &str) -> &'static str {
    let title = title.to_lowercase();
    TOPIC_PATTERNS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| title.contains(kw)))
        .map_or(DEFAULT_TOPIC, |(topic, _)| topic)
}

pub fn detect_content_type(title: &str) -> ContentType {
    if LISTICLE_RE.is_match(title.trim_start()) {
        return ContentType::Listicle;
    }
    let lower = title.to_lowercase();
    if lower.contains("review") || lower.contains("tested") {
        ContentType::Review
    } else if lower.contains("guide") || lower.contains("how to") {
        ContentType::Guide
    } else if lower.contains("comparison")
        || lower.contains("compared")
        || lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|w| w == "vs")
    {
        ContentType::Comparison
    } else {
        ContentType::Article
    }
}

pub fn categorize_source(source: &str) -> SourceKind {
    let source = source.to_lowercase();
    let has = |list: &[&str]| list.iter().any(|s| source.contains(s));
    if has(TECH_BLOGS) {
        SourceKind::TechBlog
    } else if has(NEWS_SITES) {
        SourceKind::News
    } else if has(OFFICIAL_SOURCES) {
        SourceKind::Official
    } else {
        SourceKind::General
    }
}

/// Trim to 150 chars, preferring a sentence end past the 50th char, else
/// the last whole word followed by "...".
pub fn summarize_snippet(snippet: &str) -> String {
    if snippet.chars().count() <= SNIPPET_MAX_CHARS {
        return snippet.to_string();
    }
    let cut = snippet
        .char_indices()
        .nth(SNIPPET_MAX_CHARS)
        .map_or(snippet.len(), |(i, _)| i);
    let truncated = &snippet[..cut];

    if let Some(end) = truncated.rfind(['.', '?', '!']) {
        if truncated[..end].chars().count() > MIN_SENTENCE_CHARS {
            return truncated[..=end].to_string();
        }
    }

    let word_end = truncated.rfind(' ').unwrap_or(truncated.len());
    format!("{}...", &truncated[..word_end])
}

pub fn summarize_article(article: &Article) -> String {
    let topic = detect_topic(&article.title);
    let mut summary = match detect_content_type(&article.title) {
        ContentType::Listicle => format!("This article presents a curated list focused on {topic}. "),
        ContentType::Review => format!("This review examines {topic} in detail. "),
        ContentType::Guide => format!("This comprehensive guide explores {topic}. "),
        ContentType::Comparison => format!("This comparison analyzes different options for {topic}. "),
        ContentType::Article => format!("This article discusses {topic}. "),
    };

    summary.push_str(&summarize_snippet(&article.snippet));

    let source = article
        .source
        .clone()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| domain_of(&article.url));
    if let Some(source) = source {
        summary.push_str(match categorize_source(&source) {
            SourceKind::TechBlog => " Published on a reputable technology blog.",
            SourceKind::News => " From a technology news source.",
            SourceKind::Official => " From an official product or company source.",
            SourceKind::General => "",
        });
    }

    summary.trim().to_string()
}
