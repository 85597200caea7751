use std::sync::Arc;
use std::time::Duration;
use chatgraph::llm::{ChatModel, MockChatModel, RetryingChatModel};
use chatgraph::{ChatReply, LlmError, Message};

fn hi() -> Vec<Message> {
    vec![Message::user("hi")]
}

#[tokio::test(start_paused = true)]
async fn test_transient_errors_are_retried() {
    let inner = Arc::new(MockChatModel::with_results(vec![
        Err(LlmError::Network("connection reset".to_string())),
        Err(LlmError::Api { status: 503, body: "overloaded".to_string() }),
        Ok(ChatReply::new("finally")),
    ]));
    let llm = RetryingChatModel::new(inner.clone(), 3);

    let started = tokio::time::Instant::now();
    let reply = llm.complete(&hi(), "m").await.unwrap();

    assert_eq!(reply.content, "finally");
    assert_eq!(inner.call_count(), 3);
    // 1s + 2s of back-off, on the paused clock
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(3) && waited < Duration::from_secs(4), "{waited:?}");
}

#[tokio::test(start_paused = true)]
async fn test_auth_error_is_not_retried() {
    let inner = Arc::new(MockChatModel::with_results(vec![
        Err(LlmError::Auth("HTTP 401: invalid key".to_string())),
        Ok(ChatReply::new("unreachable")),
    ]));
    let llm = RetryingChatModel::new(inner.clone(), 3);

    let err = llm.complete(&hi(), "m").await.unwrap_err();
    assert!(matches!(err, LlmError::Auth(_)));
    assert_eq!(inner.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_gives_up_after_max_retries() {
    let inner = Arc::new(MockChatModel::with_results(vec![
        Err(LlmError::RateLimited("HTTP 429".to_string())),
        Err(LlmError::RateLimited("HTTP 429".to_string())),
        Err(LlmError::RateLimited("HTTP 429 again".to_string())),
    ]));
    let llm = RetryingChatModel::new(inner.clone(), 2);

    let err = llm.complete(&hi(), "m").await.unwrap_err();
    assert_eq!(err, LlmError::RateLimited("HTTP 429 again".to_string()));
    assert_eq!(inner.call_count(), 3);
}

#[tokio::test]
async fn test_zero_retries_passes_errors_through() {
    let inner = Arc::new(MockChatModel::with_results(vec![
        Err(LlmError::Network("down".to_string())),
    ]));
    let llm = RetryingChatModel::new(inner.clone(), 0);

    assert!(llm.complete(&hi(), "m").await.is_err());
    assert_eq!(inner.call_count(), 1);
    assert_eq!(llm.provider(), "mock");
}

#[test]
fn test_backoff_schedule() {
    let net = LlmError::Network("x".to_string());
    let rate = LlmError::RateLimited("x".to_string());

    assert_eq!(RetryingChatModel::backoff(&net, 0), Duration::from_secs(1));
    assert_eq!(RetryingChatModel::backoff(&net, 3), Duration::from_secs(8));
    assert_eq!(RetryingChatModel::backoff(&rate, 0), Duration::from_secs(5));
    assert_eq!(RetryingChatModel::backoff(&rate, 2), Duration::from_secs(20));
    assert_eq!(RetryingChatModel::backoff(&rate, 4), Duration::from_secs(60));
    assert_eq!(RetryingChatModel::backoff(&net, 40), Duration::from_secs(60));
}

#[test]
fn test_error_classification() {
    assert!(matches!(LlmError::from_status(401, "no"), LlmError::Auth(_)));
    assert!(matches!(LlmError::from_status(403, "no"), LlmError::Auth(_)));
    assert!(matches!(LlmError::from_status(429, "slow down"), LlmError::RateLimited(_)));
    assert_eq!(LlmError::from_status(500, "boom"), LlmError::Api { status: 500, body: "boom".to_string() });

    assert!(LlmError::Api { status: 502, body: String::new() }.is_transient());
    assert!(!LlmError::Api { status: 400, body: String::new() }.is_transient());
    assert!(!LlmError::Config("x".to_string()).is_transient());

    assert!(matches!(LlmError::from_message("Incorrect API key provided"), LlmError::Auth(_)));
    assert!(matches!(LlmError::from_message("Rate limit reached for gpt-4o"), LlmError::RateLimited(_)));
    assert!(matches!(LlmError::from_message("model not found"), LlmError::InvalidResponse(_)));
}
