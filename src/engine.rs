use std::collections::HashMap;
use std::sync::Arc;
use crate::edges::{EdgeTable, END, START};
use crate::error::GraphError;
use crate::nodes::Node;
use crate::trace::Trace;
use crate::types::{ChatState, GraphConfig};

/// A validated, immutable graph. Cheap to share behind an `Arc` and
/// safe to invoke concurrently for independent conversations.
pub struct CompiledGraph {
    nodes:  HashMap<String, Arc<dyn Node>>,
    order:  Vec<String>,
    edges:  EdgeTable,
    config: GraphConfig,
}

impl CompiledGraph {
    /// Creates a compiled graph. Prefer `StateGraph::compile`, which validates.
    pub(crate) fn new(
        nodes:  HashMap<String, Arc<dyn Node>>,
        order:  Vec<String>,
        edges:  EdgeTable,
        config: GraphConfig,
    ) -> Self {
        Self { nodes, order, edges, config }
    }

    /// Run the graph to completion and return the final state.
    pub async fn invoke(&self, state: ChatState) -> Result<ChatState, GraphError> {
        self.invoke_with_trace(state).await.map(|(state, _)| state)
    }

    /// Run the graph and also return the per-node execution trace.
    pub async fn invoke_with_trace(&self, mut state: ChatState) -> Result<(ChatState, Trace), GraphError> {
        let mut trace = Trace::new();
        let mut steps = 0;
        let mut current = self.successor(START)?;

        trace.log(0, START, "INVOKE", &format!("messages={}", state.messages.len()));

        while current != END {
            steps += 1;
            if steps > self.config.recursion_limit {
                trace.log(steps, &current, "RECURSION_LIMIT", &format!("limit={}", self.config.recursion_limit));
                return Err(GraphError::RecursionLimit(self.config.recursion_limit));
            }

            let node = self.nodes.get(&current)
                .ok_or_else(|| GraphError::UnknownNode(current.clone()))?;

            tracing::info!(step = steps, node = %current, "running node");
            let update = match node.run(&state).await {
                Ok(update) => update,
                Err(e) => {
                    trace.log(steps, &current, "NODE_FAILED", &e.to_string());
                    return Err(e);
                }
            };

            trace.log(steps, &current, "NODE_DONE", &format!("appended={}", update.messages.len()));
            state.apply(update);

            let next = self.successor(&current)?;
            tracing::info!(from = %current, to = %next, "transition");
            current = next;
        }

        trace.log(steps, END, "COMPLETE", &format!("messages={}", state.messages.len()));
        Ok((state, trace))
    }

    fn successor(&self, from: &str) -> Result<String, GraphError> {
        self.edges.next(from)
            .map(str::to_string)
            .ok_or_else(|| GraphError::UnknownNode(format!("successor of '{}'", from)))
    }

    /// Node names in registration order.
    pub fn node_names(&self) -> &[String] {
        &self.order
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }
}
