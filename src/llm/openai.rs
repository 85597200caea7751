use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{ChatCompletionRequestMessage, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use crate::error::LlmError;
use crate::llm::ChatModel;
use crate::types::{ChatReply, Message};
use crate::usage::TokenUsage;

pub struct OpenAiChat {
    client: Client<OpenAIConfig>,
}

impl OpenAiChat {
    pub const DEFAULT_MODEL: &'static str = "gpt-4o-mini";

    /// Standard OpenAI client using OPENAI_API_KEY env var
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    /// Custom base URL — for Groq, Together, Ollama, Fireworks, etc.
    /// api_base example: "https://api.groq.com/openai/v1"
    pub fn with_base_url(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(api_base)
            .with_api_key(api_key);
        Self { client: Client::with_config(config) }
    }

    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self { client: Client::with_config(config) }
    }

    /// Our messages serialize to the wire shape async-openai expects, so a
    /// serde round-trip yields its typed request messages.
    pub(crate) fn build_messages(messages: &[Message]) -> Result<Vec<ChatCompletionRequestMessage>, LlmError> {
        let json = serde_json::to_value(messages)
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to encode messages: {}", e)))?;
        serde_json::from_value(json)
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to build messages: {}", e)))
    }

    fn map_error(err: OpenAIError) -> LlmError {
        match err {
            OpenAIError::Reqwest(e) => LlmError::Network(e.to_string()),
            OpenAIError::InvalidArgument(msg) => LlmError::Config(msg),
            other => LlmError::from_message(format!("OpenAI API error: {}", other)),
        }
    }
}

impl Default for OpenAiChat {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, messages: &[Message], model: &str) -> Result<ChatReply, LlmError> {
        let model = if model.is_empty() { Self::DEFAULT_MODEL } else { model };
        let messages = Self::build_messages(messages)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .build()
            .map_err(Self::map_error)?;

        let response = self.client.chat()
            .create(request)
            .await
            .map_err(Self::map_error)?;

        let usage = response.usage.map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens));

        let choice = response.choices.into_iter().next()
            .ok_or_else(|| LlmError::InvalidResponse("Empty response from OpenAI".to_string()))?;

        let content = choice.message.content
            .ok_or_else(|| LlmError::InvalidResponse("No content in OpenAI response".to_string()))?;

        tracing::debug!(model, chars = content.len(), "openai completion");
        Ok(ChatReply { content, usage })
    }

    fn provider(&self) -> &'static str { "openai" }
}
