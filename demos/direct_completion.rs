//! # Direct Completion Example
//!
//! Exercises the chat-completion API two ways: calling the provider client
//! directly, then through the single-node chat graph.
//!
//! # Usage
//! ```bash
//! OPENAI_API_KEY=sk-... cargo run --example direct_completion
//! RUST_LOG=debug OPENAI_API_KEY=sk-... cargo run --example direct_completion
//! ```

use std::sync::Arc;
use chatgraph::llm::{ChatModel, OpenAiChat};
use chatgraph::{chatbot_graph, ChatState, Message};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging — set RUST_LOG=debug|info|warn
    tracing_subscriber::fmt::init();

    println!("=== chatgraph Direct Completion Example ===\n");

    // Reads OPENAI_API_KEY from the environment
    let llm = Arc::new(OpenAiChat::new());

    // ── 1. Straight to the provider ──────────────────────────────────────
    let reply = llm
        .complete(
            &[
                Message::system("You are a terse assistant."),
                Message::user("Name three uses of Rust in one line."),
            ],
            "gpt-4o-mini",
        )
        .await?;
    println!("direct> {}", reply.content);
    if let Some(usage) = reply.usage {
        println!("        ({} tokens)\n", usage.total_tokens);
    }

    // ── 2. Through the graph: START → chatbot → END ──────────────────────
    let graph = chatbot_graph(llm, "gpt-4o-mini", "You are a terse assistant.")?;

    let mut state = ChatState::from_user("Hi, I'm learning Rust.");
    state = graph.invoke(state).await?;
    state.push(Message::user("What should I read first?"));

    let (state, trace) = graph.invoke_with_trace(state).await?;

    for message in &state.messages {
        println!("{:>9}> {}", message.role.as_str(), message.content);
    }
    println!("\ntotal tokens: {}", state.usage.total_tokens);
    trace.print();

    Ok(())
}
