//! Persona system prompts.
//!
//! Each office agent has a role and a personality; both map to fixed prompt
//! fragments rendered into a single template. Unknown values fall back to
//! `developer` / `focused`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const SYSTEM_PROMPT_TEMPLATE: &str = include_str!("templates/system_prompt.template");
const TOOL_USAGE_TEMPLATE: &str = include_str!("templates/tool_usage.template");

const DEFAULT_AGENT_NAME: &str = "Assistant";
const DEFAULT_ROLE: &str = "developer";
const DEFAULT_PERSONALITY: &str = "focused";

const ROLE_PROMPTS: &[(&str, &str)] = &[
    (
        "developer",
        "You are an expert software developer. You focus on code, debugging, repository management, architecture, and technical implementation. You write clean, production-ready solutions.",
    ),
    (
        "designer",
        "You are a skilled UI/UX designer. You focus on visual design, design systems, wireframes, user experience, and interface aesthetics. You think in terms of components, layouts, and user flows.",
    ),
    (
        "analyst",
        "You are a sharp data analyst. You focus on data, metrics, market research, competitive analysis, and actionable insights. You back your points with evidence and numbers.",
    ),
    (
        "writer",
        "You are a talented content writer. You focus on copywriting, documentation, social media content, blog posts, and communications. You craft compelling narratives.",
    ),
    (
        "manager",
        "You are a seasoned project manager. You focus on coordination, priorities, strategy, planning, timelines, and team alignment. You think in terms of deliverables and milestones.",
    ),
    (
        "researcher",
        "You are a thorough researcher. You focus on deep investigation, synthesis of information, sourcing references, and producing comprehensive findings.",
    ),
];

const PERSONALITY_PROMPTS: &[(&str, &str)] = &[
    (
        "enthusiastic",
        "Your communication style is high-energy and excited. Use exclamation marks, show genuine excitement about the work, and be encouraging. You radiate positivity.",
    ),
    (
        "chill",
        "Your communication style is casual and relaxed. Keep responses relatively short, use informal language, and maintain a laid-back vibe. No stress.",
    ),
    (
        "focused",
        "Your communication style is direct and concise. No fluff, no filler. Get straight to the point. Every word serves a purpose.",
    ),
    (
        "chatty",
        "Your communication style is warm and talkative. Ask follow-up questions, share related thoughts, and be conversational. You enjoy the dialogue.",
    ),
    (
        "sarcastic",
        "Your communication style includes dry humor and playful snark. Use wit, gentle sarcasm, and clever observations. You are helpful but with attitude.",
    ),
];

/// Who the office agent is for one exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub name: String,
    pub role: String,
    pub personality: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: DEFAULT_AGENT_NAME.into(),
            role: DEFAULT_ROLE.into(),
            personality: DEFAULT_PERSONALITY.into(),
        }
    }
}

impl Persona {
    /// Build a persona, substituting defaults for blank fields.
    pub fn new(name: Option<&str>, role: Option<&str>, personality: Option<&str>) -> Self {
        let pick = |value: Option<&str>, fallback: &str| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };
        Self {
            name: pick(name, DEFAULT_AGENT_NAME),
            role: pick(role, DEFAULT_ROLE),
            personality: pick(personality, DEFAULT_PERSONALITY),
        }
    }
}

fn lookup(table: &'static [(&'static str, &'static str)], key: &str, fallback: &str) -> &'static str {
    let key = key.trim().to_ascii_lowercase();
    table
        .iter()
        .find(|(name, _)| *name == key)
        .or_else(|| table.iter().find(|(name, _)| *name == fallback))
        .map(|(_, prompt)| *prompt)
        .unwrap_or_default()
}

/// Conversational system prompt for a persona.
pub fn system_prompt(persona: &Persona) -> String {
    let mut vars = BTreeMap::<&str, String>::new();
    vars.insert("AGENT_NAME", persona.name.clone());
    vars.insert(
        "ROLE_PROMPT",
        lookup(ROLE_PROMPTS, &persona.role, DEFAULT_ROLE).to_string(),
    );
    vars.insert(
        "PERSONALITY_PROMPT",
        lookup(PERSONALITY_PROMPTS, &persona.personality, DEFAULT_PERSONALITY).to_string(),
    );
    render_template(SYSTEM_PROMPT_TEMPLATE, &vars).trim().to_string()
}

/// System prompt for task execution: the persona prompt plus tool guidance
/// naming the tools offered in this exchange.
pub fn tool_aware_prompt(persona: &Persona, tool_names: &[&str]) -> String {
    let mut vars = BTreeMap::<&str, String>::new();
    vars.insert("TOOL_LIST", render_tool_list(tool_names));
    let usage = render_template(TOOL_USAGE_TEMPLATE, &vars);
    format!("{}\n\n{}", system_prompt(persona), usage.trim())
}

fn render_tool_list(tool_names: &[&str]) -> String {
    if tool_names.is_empty() {
        return "- none discovered for this request".to_string();
    }
    tool_names
        .iter()
        .map(|name| format!("- `{name}`"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_template(template: &str, vars: &BTreeMap<&str, String>) -> String {
    let mut rendered = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("{{{{{key}}}}}");
        rendered = rendered.replace(&placeholder, value);
    }
    rendered
}
