use std::sync::Mutex;
use crate::error::LlmError;
use crate::llm::ChatModel;
use crate::types::{ChatReply, Message};
use async_trait::async_trait;

/// A scripted `ChatModel`: returns the programmed results in order and
/// records every call.
pub struct MockChatModel {
    responses: Mutex<Vec<Result<ChatReply, LlmError>>>,
    call_log:  Mutex<Vec<(String, Vec<Message>)>>,  // (model, messages)
}

impl MockChatModel {
    pub fn new(replies: Vec<ChatReply>) -> Self {
        Self::with_results(replies.into_iter().map(Ok).collect())
    }

    /// Programs a mix of replies and failures.
    pub fn with_results(results: Vec<Result<ChatReply, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(results),
            call_log:  Mutex::new(Vec::new()),
        }
    }

    /// Convenience: one plain-text reply per entry.
    pub fn replying(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| ChatReply::new(*t)).collect())
    }

    /// Returns the number of times complete() was invoked
    pub fn call_count(&self) -> usize {
        self.call_log.lock().map(|log| log.len()).unwrap_or(0)
    }

    /// Returns the model string passed to the Nth call (0-indexed)
    pub fn model_for_call(&self, n: usize) -> Option<String> {
        self.call_log.lock().ok()?
            .get(n)
            .map(|(model, _)| model.clone())
    }

    /// Returns the messages passed to the Nth call (0-indexed)
    pub fn messages_for_call(&self, n: usize) -> Option<Vec<Message>> {
        self.call_log.lock().ok()?
            .get(n)
            .map(|(_, messages)| messages.clone())
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn complete(&self, messages: &[Message], model: &str) -> Result<ChatReply, LlmError> {
        if let Ok(mut log) = self.call_log.lock() {
            log.push((model.to_string(), messages.to_vec()));
        }

        let mut responses = self.responses.lock()
            .map_err(|_| LlmError::InvalidResponse("MockChatModel: poisoned".to_string()))?;
        if responses.is_empty() {
            return Err(LlmError::InvalidResponse("MockChatModel: no more programmed responses".to_string()));
        }
        responses.remove(0)
    }

    fn provider(&self) -> &'static str { "mock" }
}
