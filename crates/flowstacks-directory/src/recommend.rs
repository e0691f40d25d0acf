//! Persona-driven stack recommendations and stack export.
use std::collections::HashMap;
use std::fmt::Write as _;

use crate::model::{Pricing, Tool};

const MAX_RECOMMENDATIONS: usize = 7;
const MIN_RECOMMENDATIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Budget {
    Free,
    FreemiumOk,
    #[default]
    PaidOk,
}

impl Budget {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Some(Self::Free),
            "freemium-ok" | "freemium" => Some(Self::FreemiumOk),
            "paid-ok" | "paid" | "any" => Some(Self::PaidOk),
            _ => None,
        }
    }

    pub fn allows(self, pricing: Pricing) -> bool {
        match self {
            Self::Free => pricing == Pricing::Free,
            Self::FreemiumOk => matches!(pricing, Pricing::Free | Pricing::Freemium),
            Self::PaidOk => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Recommendation<'a> {
    pub tool: &'a Tool,
    pub score: u32,
    pub reasons: Vec<String>,
}

fn score_for_persona<'a>(tool: &'a Tool, persona: &str, focus_areas: &[String]) -> Recommendation<'a> {
    let mut score = 0;
    let mut reasons = Vec::new();

    if !persona.is_empty() && tool.best_for.iter().any(|bf| bf.to_lowercase().contains(persona)) {
        score += 2;
        reasons.push(format!("Perfect for {persona}s"));
    }
    if focus_areas.iter().any(|area| *area == tool.category) {
        score += 2;
        reasons.push(format!("Matches {} focus", tool.category));
    }
    if tool.featured {
        score += 1;
        reasons.push("Featured tool".to_string());
    }

    Recommendation { tool, score, reasons }
}

/// Up to seven tools within budget, topped up to three from the whole catalog
/// when the budget leaves too few.
pub fn recommend_tools<'a>(
    tools: &'a [Tool],
    persona: &str,
    focus_areas: &[String],
    budget: Budget,
) -> Vec<Recommendation<'a>> {
    let persona = persona.trim().to_lowercase();
    let scored: Vec<Recommendation<'a>> = tools
        .iter()
        .map(|t| score_for_persona(t, &persona, focus_areas))
        .collect();

    let mut picked: Vec<Recommendation<'a>> = scored
        .iter()
        .filter(|r| budget.allows(r.tool.pricing))
        .cloned()
        .collect();
    picked.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.tool.name.to_lowercase().cmp(&b.tool.name.to_lowercase()))
    });
    picked.truncate(MAX_RECOMMENDATIONS);

    if picked.len() < MIN_RECOMMENDATIONS {
        let mut rest: Vec<Recommendation<'a>> = scored
            .into_iter()
            .filter(|r| !picked.iter().any(|p| p.tool.id == r.tool.id))
            .collect();
        rest.sort_by(|a, b| b.score.cmp(&a.score));
        let missing = MIN_RECOMMENDATIONS - picked.len();
        picked.extend(rest.into_iter().take(missing));
    }

    picked
}

/// Markdown list of the stack grouped by category in first-seen order.
pub fn stack_markdown(tools: &[&Tool]) -> String {
    if tools.is_empty() {
        return "No tools selected.".to_string();
    }

    let mut order: Vec<&str> = Vec::new();
    let mut grouped: HashMap<&str, Vec<&Tool>> = HashMap::new();
    for &tool in tools {
        let category = tool.category.as_str();
        grouped
            .entry(category)
            .or_insert_with(|| {
                order.push(category);
                Vec::new()
            })
            .push(tool);
    }

    let mut md = String::from("# My AI Productivity Stack\n\nGenerated from FlowStacks\n\n");
    for category in order {
        let _ = write!(md, "## {}\n\n", capitalize_first(category));
        for tool in grouped.get(category).into_iter().flatten() {
            let _ = writeln!(md, "- **[{}]({})** - {}", tool.name, tool.website_url, tool.tagline);
        }
        md.push('\n');
    }
    md
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn default_collection_for_persona(persona: &str) -> Option<&'static str> {
    match persona.trim().to_lowercase().as_str() {
        "founder" | "founders" => Some("founder-focus-stack"),
        "developer" | "developers" => Some("deep-work-dev-stack"),
        "creator" | "creators" => Some("creator-studio-stack"),
        "student" | "students" => Some("student-study-stack"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{featured, tool};

    fn priced(mut t: Tool, pricing: Pricing, best_for: &[&str]) -> Tool {
        t.pricing = pricing;
        t.best_for = best_for.iter().map(|s| s.to_string()).collect();
        t
    }

    fn catalog() -> Vec<Tool> {
        vec![
            priced(tool("cursor", "Cursor", "Development Tools"), Pricing::Freemium, &["Developers"]),
            featured(priced(tool("copilot", "Copilot", "Development Tools"), Pricing::Paid, &["developers"])),
            priced(tool("otter", "Otter", "Meeting & Scheduling"), Pricing::Free, &["Students"]),
            priced(tool("jasper", "Jasper", "Writing & Communication"), Pricing::Paid, &["Marketers"]),
            priced(tool("zapier", "Zapier", "Automation & Workflows"), Pricing::Freemium, &["Founders"]),
        ]
    }

    #[test]
    fn scores_persona_focus_and_featured() {
        let tools = catalog();
        let focus = vec!["Development Tools".to_string()];
        let recs = recommend_tools(&tools, "Developer", &focus, Budget::PaidOk);
        assert_eq!(recs[0].tool.slug, "copilot");
        assert_eq!(recs[0].score, 5);
        assert_eq!(recs[1].tool.slug, "cursor");
        assert_eq!(recs[1].score, 4);
        // Remaining zero-score tools tie and fall back to name order.
        let tail: Vec<&str> = recs[2..].iter().map(|r| r.tool.name.as_str()).collect();
        assert_eq!(tail, vec!["Jasper", "Otter", "Zapier"]);
    }

    #[test]
    fn budget_filters_then_pads_to_three() {
        let tools = catalog();
        let recs = recommend_tools(&tools, "student", &[], Budget::Free);
        let slugs: Vec<&str> = recs.iter().map(|r| r.tool.slug.as_str()).collect();
        assert_eq!(slugs.len(), 3);
        assert_eq!(slugs[0], "otter");
        assert_eq!(slugs[1], "copilot");
        assert!(!slugs[2..].contains(&"otter"));
    }

    #[test]
    fn freemium_budget_excludes_paid() {
        let tools = catalog();
        let recs = recommend_tools(&tools, "founder", &[], Budget::FreemiumOk);
        assert!(recs.iter().all(|r| r.tool.pricing != Pricing::Paid));
        assert_eq!(recs[0].tool.slug, "zapier");
    }

    #[test]
    fn markdown_groups_by_category() {
        let tools = catalog();
        let stack: Vec<&Tool> = vec![&tools[0], &tools[2], &tools[1]];
        let md = stack_markdown(&stack);
        assert_eq!(
            md,
            "# My AI Productivity Stack\n\nGenerated from FlowStacks\n\n\
             ## Development Tools\n\n\
             - **[Cursor](https://cursor.example.com)** - Cursor tagline\n\
             - **[Copilot](https://copilot.example.com)** - Copilot tagline\n\n\
             ## Meeting & Scheduling\n\n\
             - **[Otter](https://otter.example.com)** - Otter tagline\n\n"
        );
        assert_eq!(stack_markdown(&[]), "No tools selected.");
    }

    #[test]
    fn persona_collections() {
        assert_eq!(default_collection_for_persona("Founders"), Some("founder-focus-stack"));
        assert_eq!(default_collection_for_persona("developer"), Some("deep-work-dev-stack"));
        assert_eq!(default_collection_for_persona("other"), None);
        assert_eq!(default_collection_for_persona(""), None);
    }
}
