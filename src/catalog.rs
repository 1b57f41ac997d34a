//! Tool catalog resolution: discovery results turned into a model manifest.
//!
//! Discovery is best-effort. A gateway failure never fails the exchange; it
//! only means the model is offered no tools this time.

use crate::gateway::{RawToolSchema, ToolGateway};
use crate::textutil::truncate_chars;
use crate::types::ToolDescriptor;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
///
/// Model providers reject tool names with other characters. The mapping is
/// per character, so applying it twice changes nothing.
pub fn sanitize_tool_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Tools offered to the model for one exchange.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolManifest {
    tools: Vec<ToolDescriptor>,
}

impl ToolManifest {
    pub fn new(tools: Vec<ToolDescriptor>) -> Self {
        Self { tools }
    }

    /// Normalize raw gateway schemas into descriptors.
    pub fn from_schemas(schemas: Vec<RawToolSchema>, description_max_chars: usize) -> Self {
        let tools = schemas
            .into_iter()
            .map(|schema| ToolDescriptor {
                sanitized_name: sanitize_tool_name(&schema.slug),
                description: truncate_chars(&schema.description, description_max_chars),
                input_schema: schema.input_schema.unwrap_or_else(empty_object_schema),
                name: schema.slug,
            })
            .collect();
        Self { tools }
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Map a model-facing name back to the gateway slug.
    ///
    /// When two slugs sanitize to the same string the first one wins. Names
    /// the manifest does not know pass through unchanged so the gateway can
    /// report the error itself.
    pub fn original_name<'a>(&'a self, sanitized: &'a str) -> &'a str {
        self.tools
            .iter()
            .find(|tool| tool.sanitized_name == sanitized)
            .map(|tool| tool.name.as_str())
            .unwrap_or(sanitized)
    }

    /// Sanitized names that map to more than one slug.
    pub fn collisions(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut dupes = Vec::new();
        for tool in &self.tools {
            let name = tool.sanitized_name.as_str();
            if !seen.insert(name) && !dupes.contains(&name) {
                dupes.push(name);
            }
        }
        dupes
    }
}

fn empty_object_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

/// Manifest plus the session to carry forward.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogResolution {
    pub manifest: ToolManifest,
    pub session: Option<String>,
}

/// Resolves free-text needs into a bounded tool manifest.
#[derive(Debug, Clone, Copy)]
pub struct ToolCatalog {
    description_max_chars: usize,
}

impl ToolCatalog {
    pub fn new(description_max_chars: usize) -> Self {
        Self {
            description_max_chars,
        }
    }

    /// Discover tools for `query`, degrading to an empty manifest on failure.
    pub async fn resolve(
        &self,
        gateway: &dyn ToolGateway,
        query: &str,
        session: Option<&str>,
    ) -> CatalogResolution {
        let prior = session.map(str::to_string);
        match gateway.discover(query, session).await {
            Ok(discovery) => {
                let manifest =
                    ToolManifest::from_schemas(discovery.tools, self.description_max_chars);
                let collisions = manifest.collisions();
                if !collisions.is_empty() {
                    warn!(names = ?collisions, "sanitized tool names collide; first match wins");
                }
                debug!(tools = manifest.len(), "tool catalog resolved");
                CatalogResolution {
                    manifest,
                    session: discovery.session.or(prior),
                }
            }
            Err(err) => {
                warn!(error = %err, "tool discovery failed; continuing without tools");
                CatalogResolution {
                    manifest: ToolManifest::default(),
                    session: prior,
                }
            }
        }
    }
}
