use std::collections::HashMap;
use std::sync::Arc;
use crate::edges::{is_reserved, EdgeTable, END, START};
use crate::engine::CompiledGraph;
use crate::error::GraphError;
use crate::llm::ChatModel;
use crate::nodes::{ChatbotNode, Node};
use crate::types::GraphConfig;

/// Declares a graph: nodes, then edges, then [`StateGraph::compile`].
///
/// Registration methods never fail on their own. Every problem is
/// collected and reported together by `compile()`.
///
/// # Example
/// ```no_run
/// # use std::sync::Arc;
/// # use chatgraph::{StateGraph, END, START};
/// # use chatgraph::llm::OpenAiChat;
/// # use chatgraph::nodes::ChatbotNode;
/// let llm = Arc::new(OpenAiChat::new());
/// let graph = StateGraph::new()
///     .add_node(ChatbotNode::new(llm, "gpt-4o-mini"))
///     .add_edge(START, "chatbot")
///     .add_edge("chatbot", END)
///     .compile()
///     .unwrap();
/// ```
pub struct StateGraph {
    nodes:    HashMap<String, Arc<dyn Node>>,
    order:    Vec<String>,
    edges:    EdgeTable,
    config:   GraphConfig,
    problems: Vec<String>,
}

impl StateGraph {
    pub fn new() -> Self {
        Self {
            nodes:    HashMap::new(),
            order:    Vec::new(),
            edges:    EdgeTable::new(),
            config:   GraphConfig::default(),
            problems: Vec::new(),
        }
    }

    pub fn add_node(self, node: impl Node + 'static) -> Self {
        self.add_shared_node(Arc::new(node))
    }

    pub fn add_shared_node(mut self, node: Arc<dyn Node>) -> Self {
        let name = node.name().to_string();
        if is_reserved(&name) {
            self.problems.push(format!("node name '{}' is reserved", name));
        } else if self.nodes.contains_key(&name) {
            self.problems.push(format!("node '{}' registered twice", name));
        } else {
            self.order.push(name.clone());
            self.nodes.insert(name, node);
        }
        self
    }

    pub fn add_edge(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        let (from, to) = (from.into(), to.into());
        if from == END {
            self.problems.push(format!("edge '{}' -> '{}' leaves END", from, to));
        } else if to == START {
            self.problems.push(format!("edge '{}' -> '{}' enters START", from, to));
        } else if let Some(prev) = self.edges.insert(from.clone(), to.clone()) {
            self.problems.push(format!(
                "'{}' already has an outgoing edge to '{}'; cannot also go to '{}'",
                from, prev, to
            ));
            self.edges.insert(from, prev);
        }
        self
    }

    pub fn set_entry_point(self, node: impl Into<String>) -> Self {
        self.add_edge(START, node)
    }

    pub fn set_finish_point(self, node: impl Into<String>) -> Self {
        self.add_edge(node, END)
    }

    pub fn recursion_limit(mut self, limit: usize) -> Self {
        self.config.recursion_limit = limit; self
    }

    /// Validates the declaration and freezes it into a runnable graph.
    pub fn compile(mut self) -> Result<CompiledGraph, GraphError> {
        if self.nodes.is_empty() {
            self.problems.push("graph has no nodes".to_string());
        }
        if self.config.recursion_limit == 0 {
            self.problems.push("recursion limit must be at least 1".to_string());
        }

        for (from, to) in self.edges.iter() {
            if from != START && !self.nodes.contains_key(from) {
                self.problems.push(format!("edge source '{}' is not a node", from));
            }
            if to != END && !self.nodes.contains_key(to) {
                self.problems.push(format!("edge target '{}' is not a node", to));
            }
        }

        if !self.edges.has_source(START) {
            self.problems.push("no entry point: add an edge from START".to_string());
        }

        for name in &self.order {
            if !self.edges.has_source(name) {
                self.problems.push(format!("node '{}' has no outgoing edge", name));
            }
        }

        if self.problems.is_empty() && !self.edges.reaches_end() {
            self.problems.push("END is not reachable from START".to_string());
        }

        if !self.problems.is_empty() {
            return Err(GraphError::Build(self.problems.join("; ")));
        }

        tracing::debug!(nodes = ?self.order, "graph compiled");
        Ok(CompiledGraph::new(self.nodes, self.order, self.edges, self.config))
    }
}

impl Default for StateGraph {
    fn default() -> Self { Self::new() }
}

/// The canonical single-node graph: `START → chatbot → END`.
pub fn chatbot_graph(
    llm:           Arc<dyn ChatModel>,
    model:         impl Into<String>,
    system_prompt: impl Into<String>,
) -> Result<CompiledGraph, GraphError> {
    let node = ChatbotNode::new(llm, model).system_prompt(system_prompt);
    StateGraph::new()
        .add_node(node)
        .set_entry_point(ChatbotNode::DEFAULT_NAME)
        .set_finish_point(ChatbotNode::DEFAULT_NAME)
        .compile()
}
