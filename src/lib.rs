pub mod types;
pub mod usage;
pub mod edges;
pub mod nodes;
pub mod builder;
pub mod engine;
pub mod trace;
pub mod error;
pub mod llm;
pub mod langflow;
pub mod session;
pub mod manifest;
pub mod config;

// Convenience re-exports at crate root
pub use builder::{chatbot_graph, StateGraph};
pub use engine::CompiledGraph;
pub use edges::{START, END};
pub use types::{ChatState, ChatReply, Message, Role, StateUpdate, GraphConfig};
pub use usage::TokenUsage;
pub use nodes::{Node, ChatbotNode};
pub use llm::{ChatModel, RetryingChatModel};
pub use session::{ChatBackend, ChatSession, GraphBackend, LangflowBackend};
pub use manifest::{DeploymentManifest, GraphRegistry};
pub use config::{AppConfig, Provider};
pub use trace::{TraceEntry, Trace};
pub use error::{GraphError, LlmError};
