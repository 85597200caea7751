use thiserror::Error;

/// Failures reported by a chat-completion provider or the Langflow run API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// Classifies a provider error message that carries no HTTP status.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("401")
            || lower.contains("403")
            || lower.contains("authentication")
            || lower.contains("unauthorized")
            || lower.contains("forbidden")
            || lower.contains("invalid api key")
            || lower.contains("incorrect api key")
        {
            Self::Auth(message)
        } else if lower.contains("429")
            || lower.contains("rate limit")
            || lower.contains("too many requests")
            || lower.contains("limit exceeded")
        {
            Self::RateLimited(message)
        } else {
            Self::InvalidResponse(message)
        }
    }

    /// Maps a non-success HTTP status and its body onto a variant.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => Self::Auth(format!("HTTP {}: {}", status, body)),
            429       => Self::RateLimited(format!("HTTP {}: {}", status, body)),
            _         => Self::Api { status, body },
        }
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited(_) | Self::Network(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Auth(_) | Self::InvalidResponse(_) | Self::Config(_) => false,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Build error: {0}")]
    Build(String),

    #[error("Node '{node}' failed: {source}")]
    NodeFailed {
        node:   String,
        #[source]
        source: LlmError,
    },

    #[error("No node registered under '{0}'")]
    UnknownNode(String),

    #[error("Recursion limit of {0} node executions reached")]
    RecursionLimit(usize),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
