//! Natural-language search query interpretation and filter suggestions.
use std::collections::HashSet;

use crate::model::Tool;

const MAX_FILTERS: usize = 5;
const MAX_TAG_FILTERS: usize = 3;
const MIN_TAG_TOOLS: usize = 2;

const QUERY_CATEGORIES: &[(&str, &[&str])] = &[
    ("coding", &["coding", "code", "programming", "developer", "development", "ide"]),
    ("writing", &["writing", "write", "content", "blog", "article", "editor"]),
    ("meeting", &["meeting", "video", "conference", "zoom", "call"]),
    ("automation", &["automation", "automate", "workflow", "integrate"]),
    ("planning", &["planning", "plan", "schedule", "calendar", "organize"]),
    ("research", &["research", "study", "learn", "academic", "paper"]),
    ("productivity", &["productivity", "productive", "efficient", "time management"]),
];

const FILTER_CATEGORIES: &[(&str, &[&str])] = &[
    ("writing", &["write", "notes", "docs", "text", "editor", "document", "content"]),
    ("meeting", &["meet", "call", "video", "conference", "schedule", "calendar"]),
    ("automation", &["automate", "workflow", "zapier", "integrate", "connect"]),
    ("planning", &["plan", "project", "task", "organize", "manage", "timeline"]),
    ("research", &["research", "search", "find", "discover", "explore", "answer"]),
    ("devtools", &["code", "dev", "developer", "programming", "git", "ide", "editor"]),
];

const FILTER_PRICING: &[(&str, &[&str])] = &[
    ("free", &["free", "no cost", "zero", "gratis"]),
    ("freemium", &["freemium", "free tier", "trial"]),
    ("paid", &["paid", "premium", "subscription", "pro"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryIntent {
    Discover,
    Compare,
    FindBest,
    General,
}

impl QueryIntent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discover => "discover",
            Self::Compare => "compare",
            Self::FindBest => "find-best",
            Self::General => "general",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    /// The query widened for a web search engine.
    pub search_terms: String,
    pub category: Option<&'static str>,
    pub intent: QueryIntent,
}

pub fn parse_natural_query(query: &str) -> ParsedQuery {
    let lower = query.to_lowercase();
    let has = |s: &str| lower.contains(s);

    let category = QUERY_CATEGORIES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| has(kw)))
        .map(|(name, _)| *name);

    let intent = if has("best") || has("top") {
        QueryIntent::FindBest
    } else if has("compare") || has("vs") {
        QueryIntent::Compare
    } else if has("find") || has("search") || has("look for") {
        QueryIntent::Discover
    } else {
        QueryIntent::General
    };

    let search_terms = match category {
        Some(cat) => format!("{cat} AI tools productivity {query}"),
        None => format!("AI productivity tools {query}"),
    };

    ParsedQuery {
        search_terms,
        category,
        intent,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Category,
    Pricing,
    Tag,
}

impl FilterKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Pricing => "pricing",
            Self::Tag => "tag",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmartFilter {
    pub kind: FilterKind,
    pub label: String,
    pub value: String,
}

impl SmartFilter {
    fn new(kind: FilterKind, value: &str) -> Self {
        Self {
            kind,
            label: capitalize(value),
            value: value.to_string(),
        }
    }
}

/// Filter chips suggested by a search query: categories and pricing from
/// keyword tables, then up to three tags shared by at least two tools that
/// mention a query word.
pub fn smart_filters(query: &str, tools: &[Tool]) -> Vec<SmartFilter> {
    let lower = query.trim().to_lowercase();
    if lower.is_empty() {
        return Vec::new();
    }
    let words: Vec<&str> = lower.split_whitespace().collect();

    let mut filters = Vec::new();

    for (category, keywords) in FILTER_CATEGORIES {
        let hit = keywords
            .iter()
            .any(|kw| words.iter().any(|w| w.contains(kw) || kw.contains(w)));
        if hit {
            filters.push(SmartFilter::new(FilterKind::Category, category));
        }
    }

    for (pricing, keywords) in FILTER_PRICING {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            filters.push(SmartFilter::new(FilterKind::Pricing, pricing));
        }
    }

    let mut tag_counts: Vec<(&str, usize)> = Vec::new();
    for tool in tools {
        let text = format!(
            "{} {} {} {}",
            tool.name,
            tool.tagline,
            tool.description,
            tool.tags.join(" ")
        )
        .to_lowercase();
        if !words.iter().any(|w| text.contains(w)) {
            continue;
        }
        for tag in &tool.tags {
            match tag_counts.iter_mut().find(|(t, _)| *t == tag.as_str()) {
                Some((_, n)) => *n += 1,
                None => tag_counts.push((tag.as_str(), 1)),
            }
        }
    }
    tag_counts.retain(|(_, n)| *n >= MIN_TAG_TOOLS);
    tag_counts.sort_by(|a, b| b.1.cmp(&a.1));
    filters.extend(
        tag_counts
            .iter()
            .take(MAX_TAG_FILTERS)
            .map(|(tag, _)| SmartFilter::new(FilterKind::Tag, tag)),
    );

    let mut seen = HashSet::new();
    filters.retain(|f| seen.insert((f.kind, f.value.clone())));
    filters.truncate(MAX_FILTERS);
    filters
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{tool, with_tags};

    #[test]
    fn parses_category_and_intent() {
        let parsed = parse_natural_query("best coding assistant");
        assert_eq!(parsed.category, Some("coding"));
        assert_eq!(parsed.intent, QueryIntent::FindBest);
        assert_eq!(parsed.search_terms, "coding AI tools productivity best coding assistant");

        let parsed = parse_natural_query("Notion vs Obsidian");
        assert_eq!(parsed.intent, QueryIntent::Compare);
        assert_eq!(parsed.category, None);
        assert_eq!(parsed.search_terms, "AI productivity tools Notion vs Obsidian");

        assert_eq!(parse_natural_query("look for a scheduler").intent, QueryIntent::Discover);
        assert_eq!(parse_natural_query("schedule").category, Some("planning"));
        assert_eq!(parse_natural_query("hello").intent, QueryIntent::General);
    }

    #[test]
    fn first_category_wins() {
        assert_eq!(parse_natural_query("code a blog").category, Some("coding"));
    }

    #[test]
    fn empty_query_yields_no_filters() {
        assert!(smart_filters("   ", &[]).is_empty());
    }

    #[test]
    fn category_and_pricing_filters() {
        let filters = smart_filters("free meeting notes", &[]);
        let values: Vec<(&str, &str)> = filters
            .iter()
            .map(|f| (f.kind.as_str(), f.value.as_str()))
            .collect();
        assert_eq!(
            values,
            vec![("category", "writing"), ("category", "meeting"), ("pricing", "free")]
        );
        assert_eq!(filters[1].label, "Meeting");
    }

    #[test]
    fn popular_tags_need_two_tools() {
        let tools = vec![
            with_tags(tool("a", "Alpha", "X"), &["transcription", "notes"]),
            with_tags(tool("b", "Bravo", "X"), &["transcription"]),
            with_tags(tool("c", "Charlie", "X"), &["summaries"]),
        ];
        let filters = smart_filters("transcription", &tools);
        let tags: Vec<&str> = filters
            .iter()
            .filter(|f| f.kind == FilterKind::Tag)
            .map(|f| f.value.as_str())
            .collect();
        assert_eq!(tags, vec!["transcription"]);
    }

    #[test]
    fn capped_at_five() {
        let filters = smart_filters("write meet automate plan research code free trial paid", &[]);
        assert_eq!(filters.len(), 5);
    }
}
