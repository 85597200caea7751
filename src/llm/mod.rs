use crate::error::LlmError;
use crate::types::{ChatReply, Message};
use async_trait::async_trait;

mod openai;
mod anthropic;
mod mock;
mod retry;

pub use openai::OpenAiChat;
pub use anthropic::AnthropicChat;
pub use mock::MockChatModel;
pub use retry::RetryingChatModel;

/// The single interface between a graph node and any chat-completion provider.
///
/// # Contract
/// - Must be Send + Sync (shared behind `Arc<dyn ChatModel>`)
/// - Receives the full ordered history, system messages included;
///   providers that take the system prompt out-of-band extract it themselves
/// - An empty `model` means "use the provider's default model"
/// - Returns `Err(LlmError)` unmodified for provider failures; callers decide
///   whether to retry (see [`RetryingChatModel`])
///
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[Message], model: &str) -> Result<ChatReply, LlmError>;

    /// Human-readable provider name, used in logs and error messages.
    fn provider(&self) -> &'static str;
}
