//! Command-palette index: one flat list of tools, collections, groups,
//! personas and navigation actions, searched with a weighted substring score.
use crate::catalog::Catalog;

const MAX_RESULTS: usize = 8;
const EMPTY_QUERY_ACTIONS: usize = 5;

const GROUPS: &[(&str, &str, &str)] = &[
    ("AI Productivity", "AI Productivity", "AI tools for productivity and workflow"),
    ("AI Coding & Developer Tools", "Developer Tools", "AI coding assistants and dev tools"),
    ("AI Design Tools", "Design Tools", "AI image, video, and design tools"),
    ("AI Content Creation", "Content Creation", "AI writing and content tools"),
];

const PERSONAS: &[(&str, &str, &str)] = &[
    ("founder", "Founders", "Tools for startup founders"),
    ("developer", "Developers", "Dev productivity tools"),
    ("student", "Students", "Study and learning tools"),
    ("creator", "Creators", "Content creation tools"),
];

const ACTIONS: &[(&str, &str, &str, &str, &[&str])] = &[
    (
        "tools",
        "Browse All Tools",
        "Explore the complete tool directory",
        "/tools",
        &["tools", "browse", "explore", "directory"],
    ),
    (
        "wizard",
        "Stack Wizard",
        "Get personalized tool recommendations",
        "/wizard",
        &["wizard", "recommendations", "personalized", "guide"],
    ),
    (
        "collections",
        "View Collections",
        "Curated tool collections",
        "/collections",
        &["collections", "stacks", "curated"],
    ),
    (
        "discover",
        "Discover Tools",
        "Find tools with AI assistance",
        "/discover",
        &["discover", "ai", "find", "search"],
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteKind {
    Tool,
    Category,
    Collection,
    Action,
    Persona,
}

impl PaletteKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::Category => "category",
            Self::Collection => "collection",
            Self::Action => "action",
            Self::Persona => "persona",
        }
    }
}

#[derive(Debug, Clone)]
pub struct PaletteEntry {
    pub kind: PaletteKind,
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub url: String,
    pub badge: Option<String>,
    /// Lowercased search terms.
    pub keywords: Vec<String>,
}

pub fn build_palette_index(catalog: &Catalog) -> Vec<PaletteEntry> {
    let mut entries = Vec::new();

    for tool in catalog.tools() {
        let mut keywords = vec![
            tool.name.to_lowercase(),
            tool.tagline.to_lowercase(),
            tool.description.to_lowercase(),
            tool.category.to_lowercase(),
            tool.pricing.as_str().to_string(),
        ];
        keywords.extend(tool.tags.iter().map(|t| t.to_lowercase()));
        keywords.extend(tool.best_for.iter().map(|b| b.to_lowercase()));
        entries.push(PaletteEntry {
            kind: PaletteKind::Tool,
            id: tool.id.clone(),
            title: tool.name.clone(),
            subtitle: Some(tool.tagline.clone()),
            description: Some(tool.description.clone()),
            url: format!("/tools/{}", tool.slug),
            badge: Some(tool.category.clone()),
            keywords,
        });
    }

    for collection in catalog.collections() {
        let mut keywords = vec![
            collection.name.to_lowercase(),
            collection.tagline.to_lowercase(),
            collection.description.to_lowercase(),
            collection.persona.to_lowercase(),
        ];
        keywords.extend(collection.tags.iter().map(|t| t.to_lowercase()));
        entries.push(PaletteEntry {
            kind: PaletteKind::Collection,
            id: collection.id.clone(),
            title: collection.name.clone(),
            subtitle: Some(format!("{} tools", collection.tool_slugs.len())),
            description: Some(collection.description.clone()),
            url: format!("/collections/{}", collection.slug),
            badge: None,
            keywords,
        });
    }

    for (id, label, description) in GROUPS {
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("group", id)
            .finish();
        entries.push(PaletteEntry {
            kind: PaletteKind::Category,
            id: id.to_string(),
            title: label.to_string(),
            subtitle: Some(description.to_string()),
            description: None,
            url: format!("/tools?{query}"),
            badge: Some("Group".to_string()),
            keywords: vec![label.to_lowercase(), description.to_lowercase()],
        });
    }

    for (id, label, description) in PERSONAS {
        entries.push(PaletteEntry {
            kind: PaletteKind::Persona,
            id: id.to_string(),
            title: label.to_string(),
            subtitle: Some(description.to_string()),
            description: None,
            url: format!("/wizard?persona={id}"),
            badge: Some("Persona".to_string()),
            keywords: vec![label.to_lowercase(), description.to_lowercase()],
        });
    }

    for (id, title, subtitle, url, keywords) in ACTIONS {
        entries.push(PaletteEntry {
            kind: PaletteKind::Action,
            id: id.to_string(),
            title: title.to_string(),
            subtitle: Some(subtitle.to_string()),
            description: None,
            url: url.to_string(),
            badge: None,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        });
    }

    entries
}

fn palette_score(entry: &PaletteEntry, term: &str, words: &[&str]) -> u32 {
    let contains = |field: &Option<String>| {
        field
            .as_deref()
            .is_some_and(|f| f.to_lowercase().contains(term))
    };

    let title = entry.title.to_lowercase();
    let mut score = 0;
    if title.contains(term) {
        score += 10;
    }
    if title.starts_with(term) {
        score += 5;
    }
    if contains(&entry.subtitle) {
        score += 5;
    }
    if contains(&entry.description) {
        score += 3;
    }
    for word in words {
        if entry.keywords.iter().any(|k| k.contains(word)) {
            score += 2;
        }
    }
    score
}

/// Best eight entries for `query`; a blank query lists the first actions.
pub fn search_palette<'a>(query: &str, index: &'a [PaletteEntry]) -> Vec<&'a PaletteEntry> {
    let term = query.trim().to_lowercase();
    if term.is_empty() {
        return index
            .iter()
            .filter(|e| e.kind == PaletteKind::Action)
            .take(EMPTY_QUERY_ACTIONS)
            .collect();
    }
    let words: Vec<&str> = term.split_whitespace().collect();

    let mut scored: Vec<(u32, &PaletteEntry)> = index
        .iter()
        .map(|e| (palette_score(e, &term, &words), e))
        .filter(|(score, _)| *score > 0)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(MAX_RESULTS).map(|(_, e)| e).collect()
}
