//! HTTP behaviour of the direct clients against a local one-shot server.

use chatgraph::langflow::LangflowClient;
use chatgraph::llm::{AnthropicChat, ChatModel};
use chatgraph::{LlmError, Message};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serves one canned response and hands back the raw request it received.
async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            if n == 0 || request_complete(&request) {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status, body.len(), body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        String::from_utf8_lossy(&request).to_string()
    });

    (format!("http://{}", addr), handle)
}

/// Headers received and `content-length` bytes of body after them.
fn request_complete(request: &[u8]) -> bool {
    let text = String::from_utf8_lossy(request);
    let Some(end) = text.find("\r\n\r\n") else { return false };
    let length = text[..end].lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    request.len() >= end + 4 + length
}

// ─────────────────────────────────────────────────────────────────────────────
// Langflow
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_langflow_missing_key_is_config_error() {
    let client = LangflowClient::new("http://127.0.0.1:9/api/v1/run/flow", None).unwrap();

    match client.run("hi", None).await {
        Err(LlmError::Config(msg)) => assert!(msg.contains("LANGFLOW_API_KEY"), "{msg}"),
        other => panic!("expected config error, got {other:?}"),
    }

    let blank = LangflowClient::new("http://127.0.0.1:9/api/v1/run/flow", Some(String::new())).unwrap();
    assert!(matches!(blank.run("hi", None).await, Err(LlmError::Config(_))));
}

#[tokio::test]
async fn test_langflow_run_sends_key_and_decodes_json() {
    let (url, server) = serve_once("200 OK", r#"{"outputs":[{"artifacts":{"message":"pong"}}]}"#).await;
    let client = LangflowClient::new(format!("{}/api/v1/run/flow", url), Some("lf-key".to_string())).unwrap();

    let body = client.run("ping", Some("sess-42")).await.unwrap();
    assert_eq!(chatgraph::langflow::extract_text(&body), "pong");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/v1/run/flow"), "{request}");
    assert!(request.to_ascii_lowercase().contains("x-api-key: lf-key"), "{request}");
    assert!(request.contains(r#""session_id":"sess-42""#), "{request}");
    assert!(request.contains(r#""input_value":"ping""#), "{request}");
}

#[tokio::test]
async fn test_langflow_non_json_body_becomes_raw_text() {
    let (url, _server) = serve_once("200 OK", "flow says hello").await;
    let client = LangflowClient::new(url, Some("lf-key".to_string())).unwrap();

    assert_eq!(client.run("hi", None).await.unwrap(), json!({ "raw_text": "flow says hello" }));
}

#[tokio::test]
async fn test_langflow_error_status_keeps_body() {
    let (url, _server) = serve_once("503 Service Unavailable", "flow offline").await;
    let client = LangflowClient::new(url, Some("lf-key".to_string())).unwrap();

    let err = client.run("hi", None).await.unwrap_err();
    assert_eq!(err, LlmError::Api { status: 503, body: "flow offline".to_string() });
}

// ─────────────────────────────────────────────────────────────────────────────
// Anthropic
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_anthropic_status_codes_map_to_error_kinds() {
    let cases = [
        ("401 Unauthorized", "bad key"),
        ("429 Too Many Requests", "slow down"),
        ("500 Internal Server Error", "boom"),
    ];
    let mut errors = Vec::new();
    for (status, body) in cases {
        let (url, _server) = serve_once(status, body).await;
        let llm = AnthropicChat::new("sk-ant").with_base_url(url);
        errors.push(llm.complete(&[Message::user("hi")], "").await.unwrap_err());
    }

    assert!(matches!(errors[0], LlmError::Auth(_)), "{:?}", errors[0]);
    assert!(matches!(errors[1], LlmError::RateLimited(_)), "{:?}", errors[1]);
    assert_eq!(errors[2], LlmError::Api { status: 500, body: "boom".to_string() });
}

#[tokio::test]
async fn test_anthropic_success_joins_text_blocks() {
    let (url, server) = serve_once("200 OK", r#"{
        "content": [{"type": "text", "text": "Hello, "}, {"type": "tool_use"}, {"type": "text", "text": "Ada."}],
        "usage": {"input_tokens": 7, "output_tokens": 3}
    }"#).await;
    let llm = AnthropicChat::new("sk-ant").with_base_url(format!("{}/", url));

    let reply = llm.complete(&[Message::system("Be brief."), Message::user("hi")], "").await.unwrap();
    assert_eq!(reply.content, "Hello, Ada.");
    assert_eq!(reply.usage.unwrap().total_tokens, 10);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /v1/messages"), "{request}");
    assert!(request.contains(r#""system":"Be brief.""#), "{request}");
}
