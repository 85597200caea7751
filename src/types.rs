use serde::{Deserialize, Serialize};
use crate::usage::TokenUsage;

/// Who authored a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System    => "system",
            Role::User      => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role:    Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn system(content: impl Into<String>)    -> Self { Self::new(Role::System, content) }
    pub fn user(content: impl Into<String>)      -> Self { Self::new(Role::User, content) }
    pub fn assistant(content: impl Into<String>) -> Self { Self::new(Role::Assistant, content) }
}

/// The state threaded through a graph.
///
/// `messages` is ordered and append-only: nodes never edit it directly,
/// they return a [`StateUpdate`] that the engine folds in with
/// [`ChatState::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatState {
    pub messages: Vec<Message>,
    /// Token usage accumulated over every model call made for this state
    #[serde(default)]
    pub usage:    TokenUsage,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a conversation from a single user message.
    pub fn from_user(content: impl Into<String>) -> Self {
        Self { messages: vec![Message::user(content)], usage: TokenUsage::default() }
    }

    pub fn with_messages(messages: Vec<Message>) -> Self {
        Self { messages, usage: TokenUsage::default() }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The most recent assistant reply, if any.
    pub fn last_reply(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::Assistant)
    }

    /// Reducer: append the update's messages and add its usage.
    pub fn apply(&mut self, update: StateUpdate) {
        self.messages.extend(update.messages);
        if let Some(usage) = update.usage {
            self.usage.add(usage);
        }
    }
}

/// What a node hands back to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateUpdate {
    pub messages: Vec<Message>,
    pub usage:    Option<TokenUsage>,
}

impl StateUpdate {
    pub fn message(message: Message) -> Self {
        Self { messages: vec![message], usage: None }
    }

    pub fn with_usage(mut self, usage: Option<TokenUsage>) -> Self {
        self.usage = usage;
        self
    }
}

/// A single reply from a chat-completion model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub content: String,
    pub usage:   Option<TokenUsage>,
}

impl ChatReply {
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into(), usage: None }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// Runtime limits for a compiled graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Hard cap on node executions per invocation
    pub recursion_limit: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self { recursion_limit: 25 }
    }
}
