use std::sync::Arc;
use crate::error::GraphError;
use crate::langflow::{LangflowClient, DEFAULT_API_URL};
use crate::llm::{AnthropicChat, ChatModel, OpenAiChat, RetryingChatModel};

/// Which service answers chat turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Langflow,
}

impl std::str::FromStr for Provider {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai"    => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            "langflow"  => Ok(Provider::Langflow),
            other       => Err(GraphError::Config(format!(
                "unknown provider '{}' (expected openai, anthropic or langflow)", other
            ))),
        }
    }
}

/// Runtime configuration, read from the process environment.
///
/// | variable                    | default                  |
/// |-----------------------------|--------------------------|
/// | `CHATGRAPH_PROVIDER`        | `openai`                 |
/// | `CHATGRAPH_MODEL`           | provider default         |
/// | `CHATGRAPH_SYSTEM_PROMPT`   | none                     |
/// | `CHATGRAPH_MAX_RETRIES`     | `2`                      |
/// | `CHATGRAPH_RECURSION_LIMIT` | `25`                     |
/// | `OPENAI_API_KEY`            | required for `openai`    |
/// | `OPENAI_BASE_URL`           | OpenAI                   |
/// | `ANTHROPIC_API_KEY`         | required for `anthropic` |
/// | `LANGFLOW_API_URL`          | local run URL            |
/// | `LANGFLOW_API_KEY`          | required for `langflow`  |
#[derive(Clone)]
pub struct AppConfig {
    pub provider:          Provider,
    pub model:             String,
    pub system_prompt:     String,
    pub max_retries:       u32,
    pub recursion_limit:   usize,
    pub openai_api_key:    Option<String>,
    pub openai_base_url:   Option<String>,
    pub anthropic_api_key: Option<String>,
    pub langflow_api_url:  String,
    pub langflow_api_key:  Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider:          Provider::OpenAi,
            model:             String::new(),
            system_prompt:     String::new(),
            max_retries:       2,
            recursion_limit:   25,
            openai_api_key:    None,
            openai_base_url:   None,
            anthropic_api_key: None,
            langflow_api_url:  DEFAULT_API_URL.to_string(),
            langflow_api_key:  None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, GraphError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key → value source. Empty values
    /// count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, GraphError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let provider = match get("CHATGRAPH_PROVIDER") {
            Some(p) => p.parse()?,
            None    => defaults.provider,
        };

        Ok(Self {
            provider,
            model:             get("CHATGRAPH_MODEL").unwrap_or_default(),
            system_prompt:     get("CHATGRAPH_SYSTEM_PROMPT").unwrap_or_default(),
            max_retries:       parse_number(get("CHATGRAPH_MAX_RETRIES"), "CHATGRAPH_MAX_RETRIES", defaults.max_retries)?,
            recursion_limit:   parse_number(get("CHATGRAPH_RECURSION_LIMIT"), "CHATGRAPH_RECURSION_LIMIT", defaults.recursion_limit)?,
            openai_api_key:    get("OPENAI_API_KEY"),
            openai_base_url:   get("OPENAI_BASE_URL"),
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            langflow_api_url:  get("LANGFLOW_API_URL").unwrap_or(defaults.langflow_api_url),
            langflow_api_key:  get("LANGFLOW_API_KEY"),
        })
    }

    /// The configured chat-completion provider, wrapped in retries.
    ///
    /// Not available for `Provider::Langflow`, which answers whole turns
    /// rather than completions; use [`AppConfig::langflow_client`].
    pub fn chat_model(&self) -> Result<Arc<dyn ChatModel>, GraphError> {
        let inner: Arc<dyn ChatModel> = match self.provider {
            Provider::OpenAi => {
                let key = self.openai_api_key.clone()
                    .ok_or_else(|| GraphError::Config("OPENAI_API_KEY not set".to_string()))?;
                match &self.openai_base_url {
                    Some(base) => Arc::new(OpenAiChat::with_base_url(base.clone(), key)),
                    None       => Arc::new(OpenAiChat::with_api_key(key)),
                }
            }
            Provider::Anthropic => {
                let key = self.anthropic_api_key.clone()
                    .ok_or_else(|| GraphError::Config("ANTHROPIC_API_KEY not set".to_string()))?;
                Arc::new(AnthropicChat::new(key))
            }
            Provider::Langflow => {
                return Err(GraphError::Config(
                    "the langflow provider has no chat model; use a Langflow backend".to_string(),
                ));
            }
        };
        Ok(Arc::new(RetryingChatModel::new(inner, self.max_retries)))
    }

    pub fn langflow_client(&self) -> Result<LangflowClient, GraphError> {
        Ok(LangflowClient::new(self.langflow_api_url.clone(), self.langflow_api_key.clone())?)
    }
}

fn parse_number<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> Result<T, GraphError> {
    match value {
        Some(v) => v.trim().parse().map_err(|_| GraphError::Config(format!("{} must be a number, got '{}'", key, v))),
        None    => Ok(default),
    }
}

fn redact(secret: &Option<String>) -> &'static str {
    if secret.is_some() { "<redacted>" } else { "<unset>" }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("system_prompt", &self.system_prompt)
            .field("max_retries", &self.max_retries)
            .field("recursion_limit", &self.recursion_limit)
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .field("anthropic_api_key", &redact(&self.anthropic_api_key))
            .field("langflow_api_url", &self.langflow_api_url)
            .field("langflow_api_key", &redact(&self.langflow_api_key))
            .finish()
    }
}
