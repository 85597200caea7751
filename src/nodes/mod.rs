use crate::error::GraphError;
use crate::types::{ChatState, StateUpdate};
use async_trait::async_trait;

mod chatbot;

pub use chatbot::ChatbotNode;

/// The contract every graph node must fulfill.
///
/// # Implementing a Node
///
/// 1. `run()` reads the current state and returns a [`StateUpdate`];
///    it never mutates the state itself. The engine applies the update.
/// 2. `name()` must be unique within a graph and must not be one of the
///    reserved pseudo-node names (`START` / `END`).
/// 3. Return `Err` when the step cannot produce an update. The error
///    aborts the whole invocation unmodified.
///
#[async_trait]
pub trait Node: Send + Sync {
    /// Returns the unique name of this node.
    /// Edges refer to the node by this name.
    fn name(&self) -> &str;

    async fn run(&self, state: &ChatState) -> Result<StateUpdate, GraphError>;
}
