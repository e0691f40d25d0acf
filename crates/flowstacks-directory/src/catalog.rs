use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::AppError;
use crate::model::{Collection, Pricing, Tool};

/// Read-only tool and collection catalog, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tools: Vec<Tool>,
    collections: Vec<Collection>,
    tool_index: HashMap<String, usize>,
    collection_index: HashMap<String, usize>,
}

#[derive(Debug, Clone, Default)]
pub struct ToolFilter {
    pub category: Option<String>,
    pub group: Option<String>,
    pub pricing: Option<Pricing>,
    pub featured_only: bool,
    pub query: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub name: String,
    pub group: String,
    pub tool_count: usize,
}

impl Catalog {
    /// Load `tools_path` (required) and `collections_path` (skipped when absent).
    pub fn load(tools_path: &Path, collections_path: &Path) -> Result<Self, AppError> {
        let tools: Vec<Tool> = read_json(tools_path)?;
        let collections: Vec<Collection> = if collections_path.exists() {
            read_json(collections_path)?
        } else {
            Vec::new()
        };
        Self::from_parts(tools, collections)
    }

    pub fn from_parts(tools: Vec<Tool>, collections: Vec<Collection>) -> Result<Self, AppError> {
        let mut tool_index = HashMap::with_capacity(tools.len());
        for (i, tool) in tools.iter().enumerate() {
            if tool_index.insert(tool.slug.clone(), i).is_some() {
                return Err(AppError::Catalog {
                    file: "tools".to_string(),
                    message: format!("duplicate tool slug: {}", tool.slug),
                });
            }
        }

        let mut collection_index = HashMap::with_capacity(collections.len());
        for (i, collection) in collections.iter().enumerate() {
            if collection_index.insert(collection.slug.clone(), i).is_some() {
                return Err(AppError::Catalog {
                    file: "collections".to_string(),
                    message: format!("duplicate collection slug: {}", collection.slug),
                });
            }
        }

        Ok(Self {
            tools,
            collections,
            tool_index,
            collection_index,
        })
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn tool_by_slug(&self, slug: &str) -> Option<&Tool> {
        self.tool_index.get(slug).map(|&i| &self.tools[i])
    }

    pub fn tool_by_id(&self, id: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.id == id)
    }

    /// Tools for `slugs` in input order; unknown slugs are skipped.
    pub fn tools_by_slugs<S: AsRef<str>>(&self, slugs: &[S]) -> Vec<&Tool> {
        slugs
            .iter()
            .filter_map(|s| self.tool_by_slug(s.as_ref()))
            .collect()
    }

    pub fn featured_tools(&self) -> Vec<&Tool> {
        self.tools.iter().filter(|t| t.featured).collect()
    }

    pub fn tools_by_category(&self, category: &str) -> Vec<&Tool> {
        self.tools.iter().filter(|t| t.category == category).collect()
    }

    pub fn tools_by_group(&self, group: &str) -> Vec<&Tool> {
        self.tools.iter().filter(|t| t.group == group).collect()
    }

    pub fn collection_by_slug(&self, slug: &str) -> Option<&Collection> {
        self.collection_index
            .get(slug)
            .map(|&i| &self.collections[i])
    }

    pub fn collection_by_id(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    pub fn collection_tools(&self, collection: &Collection) -> Vec<&Tool> {
        self.tools_by_slugs(collection.tool_slugs.as_slice())
    }

    pub fn search(&self, query: &str) -> Vec<&Tool> {
        search_tools(query, &self.tools)
    }

    pub fn filter(&self, filter: &ToolFilter) -> Vec<&Tool> {
        let candidates = match (filter.query.as_deref(), filter.category.as_deref(), filter.group.as_deref()) {
            (Some(q), _, _) => self.search(q),
            (None, Some(c), _) => self.tools_by_category(c),
            (None, None, Some(g)) => self.tools_by_group(g),
            (None, None, None) if filter.featured_only => self.featured_tools(),
            (None, None, None) => self.tools.iter().collect(),
        };
        candidates
            .into_iter()
            .filter(|t| filter.category.as_deref().map_or(true, |c| t.category == c))
            .filter(|t| filter.group.as_deref().map_or(true, |g| t.group == g))
            .filter(|t| filter.pricing.map_or(true, |p| t.pricing == p))
            .filter(|t| !filter.featured_only || t.featured)
            .collect()
    }

    /// Up to `limit` other tools in the same category, featured first.
    pub fn related_tools(&self, tool: &Tool, limit: usize) -> Vec<&Tool> {
        let mut related: Vec<&Tool> = self
            .tools_by_category(&tool.category)
            .into_iter()
            .filter(|t| t.slug != tool.slug)
            .collect();
        related.sort_by_key(|t| !t.featured);
        related.truncate(limit);
        related
    }

    /// Categories in first-seen catalog order with their tool counts.
    pub fn categories(&self) -> Vec<CategoryCount> {
        let mut order: Vec<CategoryCount> = Vec::new();
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for tool in &self.tools {
            match seen.get(tool.category.as_str()) {
                Some(&i) => order[i].tool_count += 1,
                None => {
                    seen.insert(tool.category.as_str(), order.len());
                    order.push(CategoryCount {
                        name: tool.category.clone(),
                        group: tool.group.clone(),
                        tool_count: 1,
                    });
                }
            }
        }
        order
    }

    /// Collection slugs whose tool lists reference tools missing from the catalog.
    pub fn dangling_collection_refs(&self) -> Vec<(String, String)> {
        let known: HashSet<&str> = self.tools.iter().map(|t| t.slug.as_str()).collect();
        self.collections
            .iter()
            .flat_map(|c| {
                c.tool_slugs
                    .iter()
                    .filter(|s| !known.contains(s.as_str()))
                    .map(|s| (c.slug.clone(), s.clone()))
            })
            .collect()
    }
}

/// Case-insensitive substring search over name, tagline, description, tags
/// and category. A blank query returns every tool.
pub fn search_tools<'a>(query: &str, tools: &'a [Tool]) -> Vec<&'a Tool> {
    if query.trim().is_empty() {
        return tools.iter().collect();
    }
    let term = query.trim().to_lowercase();
    tools
        .iter()
        .filter(|tool| {
            tool.name.to_lowercase().contains(&term)
                || tool.tagline.to_lowercase().contains(&term)
                || tool.description.to_lowercase().contains(&term)
                || tool.tags.iter().any(|tag| tag.to_lowercase().contains(&term))
                || tool.category.to_lowercase().contains(&term)
        })
        .collect()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, AppError> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{featured, tool, with_tags};

    fn sample() -> Catalog {
        let tools = vec![
            featured(with_tags(
                tool("github-copilot", "GitHub Copilot", "Development Tools"),
                &["coding", "ai"],
            )),
            tool("cursor", "Cursor", "Development Tools"),
            with_tags(tool("otter-ai", "Otter.ai", "Meeting & Scheduling"), &["transcription"]),
        ];
        let collections = vec![Collection {
            id: "c1".to_string(),
            name: "Deep Work Dev Stack".to_string(),
            slug: "deep-work-dev-stack".to_string(),
            tagline: "Ship faster".to_string(),
            description: "For developers".to_string(),
            persona: "developer".to_string(),
            tags: vec![],
            tool_slugs: vec!["cursor".to_string(), "github-copilot".to_string(), "gone".to_string()],
            featured: true,
        }];
        Catalog::from_parts(tools, collections).expect("valid catalog")
    }

    #[test]
    fn lookup_by_slug_and_id() {
        let catalog = sample();
        assert_eq!(catalog.tool_by_slug("cursor").map(|t| t.name.as_str()), Some("Cursor"));
        assert_eq!(catalog.tool_by_id("otter-ai").map(|t| t.slug.as_str()), Some("otter-ai"));
        assert!(catalog.tool_by_slug("missing").is_none());
    }

    #[test]
    fn duplicate_slug_rejected() {
        let tools = vec![tool("a", "A", "X"), tool("a", "A2", "X")];
        let err = Catalog::from_parts(tools, Vec::new()).unwrap_err();
        assert!(err.to_string().contains("duplicate tool slug: a"));
    }

    #[test]
    fn slugs_resolve_in_input_order() {
        let catalog = sample();
        let collection = catalog.collection_by_slug("deep-work-dev-stack").expect("exists");
        let names: Vec<&str> = catalog
            .collection_tools(collection)
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["Cursor", "GitHub Copilot"]);
        assert_eq!(
            catalog.dangling_collection_refs(),
            vec![("deep-work-dev-stack".to_string(), "gone".to_string())]
        );
    }

    #[test]
    fn search_matches_tags_and_category() {
        let catalog = sample();
        assert_eq!(catalog.search("TRANSCRIPTION").len(), 1);
        assert_eq!(catalog.search("  cursor ").len(), 1);
        assert_eq!(catalog.search("development").len(), 2);
        assert_eq!(catalog.search("  ").len(), 3);
        assert!(catalog.search("spreadsheet").is_empty());
    }

    #[test]
    fn filter_combines_criteria() {
        let catalog = sample();
        let filter = ToolFilter {
            category: Some("Development Tools".to_string()),
            featured_only: true,
            ..Default::default()
        };
        let hits = catalog.filter(&filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].slug, "github-copilot");

        let by_pricing = ToolFilter {
            pricing: Some(Pricing::Paid),
            ..Default::default()
        };
        assert!(catalog.filter(&by_pricing).is_empty());
    }

    #[test]
    fn filter_by_group_and_featured() {
        let catalog = sample();
        let by_group = ToolFilter {
            group: Some("AI Productivity".to_string()),
            ..Default::default()
        };
        assert_eq!(catalog.filter(&by_group).len(), 3);
        let featured_only = ToolFilter {
            featured_only: true,
            ..Default::default()
        };
        let hits = catalog.filter(&featured_only);
        assert_eq!(hits.len(), 1);
        assert_eq!(catalog.featured_tools().len(), 1);
        assert_eq!(catalog.collection_by_id("c1").map(|c| c.slug.as_str()), Some("deep-work-dev-stack"));
    }

    #[test]
    fn categories_count_tools() {
        let categories = sample().categories();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].name, "Development Tools");
        assert_eq!(categories[0].tool_count, 2);
    }

    #[test]
    fn related_excludes_self_and_prefers_featured() {
        let catalog = sample();
        let cursor = catalog.tool_by_slug("cursor").expect("exists");
        let related = catalog.related_tools(cursor, 6);
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].slug, "github-copilot");
    }

    #[test]
    fn load_from_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tools_path = dir.path().join("tools.json");
        let tools = vec![tool("perplexity", "Perplexity", "Research & Analysis")];
        std::fs::write(&tools_path, serde_json::to_string(&tools).expect("serialize"))
            .expect("write tools");

        let catalog = Catalog::load(&tools_path, &dir.path().join("collections.json"))
            .expect("load succeeds");
        assert_eq!(catalog.tools().len(), 1);
        assert!(catalog.collections().is_empty());
    }

    #[test]
    fn bundled_data_is_consistent() {
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
        let catalog = Catalog::load(&data.join("tools.json"), &data.join("collections.json"))
            .expect("bundled catalog loads");
        assert!(!catalog.tools().is_empty());
        assert!(catalog.dangling_collection_refs().is_empty());
        for slug in ["founder-focus-stack", "deep-work-dev-stack", "creator-studio-stack", "student-study-stack"] {
            assert!(catalog.collection_by_slug(slug).is_some(), "missing collection {slug}");
        }
    }

    #[test]
    fn load_reports_invalid_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tools_path = dir.path().join("tools.json");
        std::fs::write(&tools_path, "[{").expect("write tools");
        let err = Catalog::load(&tools_path, &dir.path().join("collections.json")).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }
}
