//! Tool trait — the capability-shaped access surface.
//!
//! The gateway exposes a fixed set of named, parameterized operations and
//! nothing else: no raw query, no arbitrary field path. Each tool validates
//! its own arguments and runs the full authorize → select → scrub pipeline
//! before returning.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{GatewayError, Result};

/// A tool described to callers: name, purpose, and JSON-Schema parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// The core Tool trait.
///
/// Each operation (list_patients, get_vitals, ask_about_patient, ...)
/// implements this trait and is registered in the [`ToolRegistry`].
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique operation name (e.g., "get_vitals").
    fn name(&self) -> &str;

    /// What this operation does, shown to callers.
    fn description(&self) -> &str;

    /// JSON Schema describing this operation's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute with the given arguments. Returns the success payload;
    /// every failure is one of the [`GatewayError`] kinds.
    async fn execute(&self, arguments: serde_json::Value) -> Result<serde_json::Value>;

    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of the available tools — the closed operation surface.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Definitions of all registered tools, sorted by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Execute a named tool. An unknown name is an invalid request — the
    /// surface is closed, so this is a caller error, not a missing feature.
    pub async fn execute(&self, name: &str, arguments: serde_json::Value) -> Result<serde_json::Value> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| GatewayError::InvalidRequest(format!("unknown tool: {name}")))?;
        tool.execute(arguments).await
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
