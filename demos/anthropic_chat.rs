//! # Anthropic Chat Example
//!
//! Runs a short scripted conversation through the chat graph backed by
//! `AnthropicChat` (raw reqwest against the Messages API), with retries.
//!
//! # Usage
//! ```bash
//! ANTHROPIC_API_KEY=sk-ant-... cargo run --example anthropic_chat
//! RUST_LOG=info ANTHROPIC_API_KEY=sk-ant-... cargo run --example anthropic_chat
//! ```

use std::sync::Arc;
use chatgraph::llm::AnthropicChat;
use chatgraph::{chatbot_graph, ChatSession, GraphBackend, RetryingChatModel};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== chatgraph Anthropic Chat Example ===\n");

    let anthropic = AnthropicChat::from_env()?.max_tokens(512);
    let llm = Arc::new(RetryingChatModel::new(Arc::new(anthropic), 2));

    // Empty model name → AnthropicChat::DEFAULT_MODEL
    let graph = chatbot_graph(
        llm,
        "",
        "You are a friendly tutor for systems programming. Keep answers under 80 words.",
    )?;

    let mut session = ChatSession::new(Arc::new(GraphBackend::new(Arc::new(graph))));
    println!("session {}\n", session.id());

    for question in [
        "What does the borrow checker do?",
        "And how is that different from garbage collection?",
    ] {
        println!("you> {}", question);
        println!("bot> {}\n", session.send(question).await);
    }

    Ok(())
}
