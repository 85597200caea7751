use std::sync::Arc;
use async_trait::async_trait;
use uuid::Uuid;
use crate::engine::CompiledGraph;
use crate::error::GraphError;
use crate::langflow::{extract_text, LangflowClient};
use crate::types::{ChatState, Message, Role};

pub const NO_ANSWER: &str = "No human-readable answer found.";

/// Anything that can answer the next turn of a conversation.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Shown to the user when the backend fails, e.g. "Error calling <name>: ...".
    fn name(&self) -> &'static str;

    /// Produce the reply to the newest user message in `history`.
    async fn respond(&self, session_id: &str, history: &[Message]) -> Result<String, GraphError>;
}

/// Answers by invoking a compiled graph with the whole history.
pub struct GraphBackend {
    graph: Arc<CompiledGraph>,
}

impl GraphBackend {
    pub fn new(graph: Arc<CompiledGraph>) -> Self {
        Self { graph }
    }
}

#[async_trait]
impl ChatBackend for GraphBackend {
    fn name(&self) -> &'static str { "chat graph" }

    async fn respond(&self, session_id: &str, history: &[Message]) -> Result<String, GraphError> {
        let turns = history.len();
        let state = self.graph.invoke(ChatState::with_messages(history.to_vec())).await?;
        tracing::debug!(session_id, total_tokens = state.usage.total_tokens, "graph turn complete");

        state.messages.get(turns..)
            .and_then(|new| new.iter().rev().find(|m| m.role == Role::Assistant))
            .map(|m| m.content.clone())
            .ok_or_else(|| GraphError::InvalidState("graph produced no assistant reply".to_string()))
    }
}

/// Answers by running a Langflow flow with the newest user message; the
/// flow keeps its own memory keyed by session id.
pub struct LangflowBackend {
    client: LangflowClient,
}

impl LangflowBackend {
    pub fn new(client: LangflowClient) -> Self {
        Self { client }
    }

    /// Picks the answer out of a run response.
    pub fn answer_from(raw: &serde_json::Value) -> String {
        let answer = extract_text(raw);
        if !answer.is_empty() {
            return answer;
        }
        raw.get("raw_text")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| NO_ANSWER.to_string())
    }
}

#[async_trait]
impl ChatBackend for LangflowBackend {
    fn name(&self) -> &'static str { "Langflow API" }

    async fn respond(&self, session_id: &str, history: &[Message]) -> Result<String, GraphError> {
        let input = history.iter().rev()
            .find(|m| m.role == Role::User)
            .ok_or_else(|| GraphError::InvalidState("no user message to send".to_string()))?;

        let raw = self.client.run(&input.content, Some(session_id)).await?;
        Ok(Self::answer_from(&raw))
    }
}

/// One conversation with a backend: a stable session id plus the
/// ordered transcript.
pub struct ChatSession {
    id:      String,
    history: Vec<Message>,
    backend: Arc<dyn ChatBackend>,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            id:      Uuid::new_v4().to_string(),
            history: Vec::new(),
            backend,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Sends one user turn and returns the answer that was recorded.
    ///
    /// Backend failures do not end the session: the error text is recorded
    /// as the assistant's turn and returned.
    pub async fn send(&mut self, input: impl Into<String>) -> String {
        self.history.push(Message::user(input));

        let answer = match self.backend.respond(&self.id, &self.history).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(session_id = %self.id, backend = self.backend.name(), error = %e, "backend failed");
                format!("Error calling {}: {}", self.backend.name(), e)
            }
        };

        self.history.push(Message::assistant(answer.clone()));
        answer
    }

    /// Forgets the transcript and starts over under a new session id.
    pub fn clear(&mut self) {
        self.history.clear();
        self.id = Uuid::new_v4().to_string();
    }
}
