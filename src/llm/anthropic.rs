use async_trait::async_trait;
use crate::error::LlmError;
use crate::llm::ChatModel;
use crate::types::{ChatReply, Message, Role};
use crate::usage::TokenUsage;

// ── Anthropic request types ──────────────────────────────

#[derive(serde::Serialize, Debug, PartialEq)]
pub(crate) struct AnthropicRequest {
    model:      String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system:     Option<String>,
    messages:   Vec<AnthropicMessage>,
}

#[derive(serde::Serialize, Debug, Clone, PartialEq)]
struct AnthropicMessage {
    role:    &'static str,
    content: String,
}

// ── Anthropic response types ─────────────────────────────

#[derive(serde::Deserialize, Debug)]
pub(crate) struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    usage:   Option<AnthropicUsage>,
}

#[derive(serde::Deserialize, Debug)]
struct AnthropicUsage {
    input_tokens:  u32,
    output_tokens: u32,
}

#[derive(serde::Deserialize, Debug)]
#[serde(tag = "type")]
enum AnthropicContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(other)]
    Other,
}

// ── Caller ───────────────────────────────────────────────

pub struct AnthropicChat {
    client:     reqwest::Client,
    api_key:    String,
    api_base:   String,
    max_tokens: u32,
}

impl AnthropicChat {
    pub const DEFAULT_MODEL: &'static str = "claude-3-5-haiku-latest";
    const API_VERSION: &'static str = "2023-06-01";

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client:     reqwest::Client::new(),
            api_key:    api_key.into(),
            api_base:   "https://api.anthropic.com".to_string(),
            max_tokens: 1024,
        }
    }

    pub fn from_env() -> Result<Self, LlmError> {
        let key = std::env::var("ANTHROPIC_API_KEY")
            .map_err(|_| LlmError::Config("ANTHROPIC_API_KEY not set".to_string()))?;
        Ok(Self::new(key))
    }

    pub fn with_base_url(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string(); self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = n; self
    }

    /// System messages travel in the top-level `system` field; everything
    /// else keeps its order in `messages`.
    pub(crate) fn build_request(&self, messages: &[Message], model: &str) -> AnthropicRequest {
        let system: Vec<&str> = messages.iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        AnthropicRequest {
            model:      if model.is_empty() { Self::DEFAULT_MODEL.to_string() } else { model.to_string() },
            max_tokens: self.max_tokens,
            system:     if system.is_empty() { None } else { Some(system.join("\n\n")) },
            messages:   messages.iter()
                .filter(|m| m.role != Role::System)
                .map(|m| AnthropicMessage { role: m.role.as_str(), content: m.content.clone() })
                .collect(),
        }
    }

    pub(crate) fn parse_response(parsed: AnthropicResponse) -> Result<ChatReply, LlmError> {
        let text: Vec<String> = parsed.content.into_iter()
            .filter_map(|block| match block {
                AnthropicContentBlock::Text { text } => Some(text),
                AnthropicContentBlock::Other => None,
            })
            .collect();

        if text.is_empty() {
            return Err(LlmError::InvalidResponse("Anthropic returned no text content".to_string()));
        }

        Ok(ChatReply {
            content: text.concat(),
            usage:   parsed.usage.map(|u| TokenUsage::new(u.input_tokens, u.output_tokens)),
        })
    }
}

#[async_trait]
impl ChatModel for AnthropicChat {
    async fn complete(&self, messages: &[Message], model: &str) -> Result<ChatReply, LlmError> {
        let body = self.build_request(messages, model);

        let response = self.client
            .post(format!("{}/v1/messages", self.api_base))
            .header("x-api-key",         &self.api_key)
            .header("anthropic-version", Self::API_VERSION)
            .header("content-type",      "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::from_status(status.as_u16(), body));
        }

        let parsed: AnthropicResponse = response.json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse Anthropic response: {}", e)))?;

        Self::parse_response(parsed)
    }

    fn provider(&self) -> &'static str { "anthropic" }
}
