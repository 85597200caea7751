use crate::error::GraphError;
use crate::llm::ChatModel;
use crate::nodes::Node;
use crate::types::{ChatState, Message, Role, StateUpdate};
use async_trait::async_trait;
use std::sync::Arc;

/// Forwards the conversation history to a chat model and appends the reply.
pub struct ChatbotNode {
    name:          String,
    llm:           Arc<dyn ChatModel>,
    model:         String,
    system_prompt: Option<String>,
}

impl ChatbotNode {
    pub const DEFAULT_NAME: &'static str = "chatbot";

    /// An empty `model` lets the provider pick its own default.
    pub fn new(llm: Arc<dyn ChatModel>, model: impl Into<String>) -> Self {
        Self {
            name:          Self::DEFAULT_NAME.to_string(),
            llm,
            model:         model.into(),
            system_prompt: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into(); self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        self.system_prompt = if prompt.is_empty() { None } else { Some(prompt) };
        self
    }

    fn build_messages(&self, state: &ChatState) -> Vec<Message> {
        let mut messages = Vec::with_capacity(state.messages.len() + 1);
        let has_system = state.messages.first().map(|m| m.role == Role::System).unwrap_or(false);
        if let Some(prompt) = &self.system_prompt {
            if !has_system {
                messages.push(Message::system(prompt.clone()));
            }
        }
        messages.extend(state.messages.iter().cloned());
        messages
    }
}

#[async_trait]
impl Node for ChatbotNode {
    fn name(&self) -> &str { &self.name }

    async fn run(&self, state: &ChatState) -> Result<StateUpdate, GraphError> {
        if state.messages.is_empty() {
            return Err(GraphError::InvalidState("conversation has no messages".to_string()));
        }

        let messages = self.build_messages(state);
        tracing::debug!(node = %self.name, model = %self.model, messages = messages.len(), "calling chat model");

        let reply = self.llm
            .complete(&messages, &self.model)
            .await
            .map_err(|source| GraphError::NodeFailed { node: self.name.clone(), source })?;

        Ok(StateUpdate::message(Message::assistant(reply.content)).with_usage(reply.usage))
    }
}
