//! Deployment manifest: names the graphs a hosted runtime can serve.
//!
//! ```json
//! {
//!   "dependencies": ["."],
//!   "graphs": { "agent": "src/manifest.rs:chatbot" },
//!   "env": ".env"
//! }
//! ```
//!
//! Each graph entry is `"<path>:<symbol>"`. The path is informational;
//! the symbol is looked up in a [`GraphRegistry`].

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::builder::StateGraph;
use crate::config::AppConfig;
use crate::engine::CompiledGraph;
use crate::error::GraphError;
use crate::nodes::ChatbotNode;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentManifest {
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub graphs:       BTreeMap<String, String>,
    /// Plaintext credentials file. Accepted but never read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env:          Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEntrypoint {
    pub path:   String,
    pub symbol: String,
}

impl std::str::FromStr for GraphEntrypoint {
    type Err = GraphError;

    fn from_str(entry: &str) -> Result<Self, Self::Err> {
        match entry.rsplit_once(':') {
            Some((path, symbol)) if !path.trim().is_empty() && !symbol.trim().is_empty() => Ok(Self {
                path:   path.trim().to_string(),
                symbol: symbol.trim().to_string(),
            }),
            _ => Err(GraphError::Manifest(format!(
                "entrypoint '{}' is not of the form '<path>:<symbol>'", entry
            ))),
        }
    }
}

impl DeploymentManifest {
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        let manifest: Self = serde_json::from_str(json)
            .map_err(|e| GraphError::Manifest(format!("invalid manifest: {}", e)))?;
        if manifest.graphs.is_empty() {
            return Err(GraphError::Manifest("manifest declares no graphs".to_string()));
        }
        if let Some(env) = &manifest.env {
            tracing::warn!(env = %env, "manifest names an env file; it is ignored, set credentials in the environment");
        }
        Ok(manifest)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .map_err(|e| GraphError::Manifest(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&data)
    }

    pub fn entrypoint(&self, graph: &str) -> Result<GraphEntrypoint, GraphError> {
        self.graphs.get(graph)
            .ok_or_else(|| GraphError::Manifest(format!(
                "graph '{}' not in manifest (available: {})",
                graph,
                self.graphs.keys().cloned().collect::<Vec<_>>().join(", ")
            )))?
            .parse()
    }
}

pub type GraphFactory = fn(&AppConfig) -> Result<CompiledGraph, GraphError>;

/// Maps manifest symbols to the functions that build their graphs.
#[derive(Default)]
pub struct GraphRegistry {
    factories: HashMap<String, GraphFactory>,
}

impl GraphRegistry {
    pub fn new() -> Self {
        Self { factories: HashMap::new() }
    }

    /// A registry with the `chatbot` graph.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("chatbot", build_chatbot);
        registry
    }

    pub fn register(&mut self, symbol: impl Into<String>, factory: GraphFactory) {
        self.factories.insert(symbol.into(), factory);
    }

    pub fn has(&self, symbol: &str) -> bool {
        self.factories.contains_key(symbol)
    }

    /// Looks up `graph` in the manifest and builds it.
    pub fn resolve(
        &self,
        manifest: &DeploymentManifest,
        graph:    &str,
        config:   &AppConfig,
    ) -> Result<Arc<CompiledGraph>, GraphError> {
        let entry = manifest.entrypoint(graph)?;
        let factory = self.factories.get(&entry.symbol)
            .ok_or_else(|| GraphError::Manifest(format!(
                "graph '{}' points at unknown symbol '{}' ({})", graph, entry.symbol, entry.path
            )))?;
        tracing::info!(graph, path = %entry.path, symbol = %entry.symbol, "resolving graph");
        factory(config).map(Arc::new)
    }
}

fn build_chatbot(config: &AppConfig) -> Result<CompiledGraph, GraphError> {
    let node = ChatbotNode::new(config.chat_model()?, config.model.clone())
        .system_prompt(config.system_prompt.clone());
    StateGraph::new()
        .add_node(node)
        .set_entry_point(ChatbotNode::DEFAULT_NAME)
        .set_finish_point(ChatbotNode::DEFAULT_NAME)
        .recursion_limit(config.recursion_limit)
        .compile()
}
