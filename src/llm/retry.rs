use crate::error::LlmError;
use crate::llm::ChatModel;
use crate::types::{ChatReply, Message};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// A wrapper around any `ChatModel` that retries transient failures
/// with exponential back-off.
pub struct RetryingChatModel {
    inner:       Arc<dyn ChatModel>,
    max_retries: u32,
}

impl RetryingChatModel {
    pub fn new(inner: Arc<dyn ChatModel>, max_retries: u32) -> Self {
        Self { inner, max_retries }
    }

    /// Wait before retry number `attempt + 1`. Rate limits start at 5s,
    /// everything else at 1s; both double per attempt, capped at 60s.
    pub fn backoff(err: &LlmError, attempt: u32) -> Duration {
        let base: u64 = if err.is_rate_limit() { 5 } else { 1 };
        let secs = base << attempt.min(6);
        Duration::from_secs(std::cmp::min(secs, 60))
    }
}

#[async_trait]
impl ChatModel for RetryingChatModel {
    async fn complete(&self, messages: &[Message], model: &str) -> Result<ChatReply, LlmError> {
        let mut attempt = 0;
        loop {
            match self.inner.complete(messages, model).await {
                Ok(reply) => return Ok(reply),
                Err(e) if !e.is_transient() => {
                    tracing::error!(provider = self.inner.provider(), error = %e, "LLM error — not retrying");
                    return Err(e);
                }
                Err(e) if attempt >= self.max_retries => {
                    tracing::error!(
                        provider = self.inner.provider(),
                        retries  = self.max_retries,
                        error    = %e,
                        "LLM failed after retries"
                    );
                    return Err(e);
                }
                Err(e) => {
                    let wait = Self::backoff(&e, attempt);
                    tracing::warn!(
                        provider = self.inner.provider(),
                        attempt  = attempt + 1,
                        max      = self.max_retries,
                        wait_s   = wait.as_secs(),
                        error    = %e,
                        "LLM transient error — retrying"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
            }
        }
    }

    fn provider(&self) -> &'static str {
        self.inner.provider()
    }
}
