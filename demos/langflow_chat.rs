//! # Langflow Chat Example
//!
//! Sends questions to a Langflow flow and prints the extracted answers.
//! The flow keeps conversational memory keyed by the session id.
//!
//! # Usage
//! ```bash
//! LANGFLOW_API_KEY=... cargo run --example langflow_chat -- "What is in my documents?"
//! LANGFLOW_API_URL=http://host:7860/api/v1/run/<flow-id> LANGFLOW_API_KEY=... \
//!     cargo run --example langflow_chat -- "Summarize chapter 2"
//! ```

use std::sync::Arc;
use chatgraph::langflow::LangflowClient;
use chatgraph::{ChatSession, LangflowBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let client = LangflowClient::from_env()?;
    println!("=== chatgraph Langflow Example ({}) ===\n", client.api_url());

    let mut session = ChatSession::new(Arc::new(LangflowBackend::new(client)));

    let questions: Vec<String> = std::env::args().skip(1).collect();
    let questions = if questions.is_empty() {
        vec!["Ask anything about your documents.".to_string()]
    } else {
        questions
    };

    for question in questions {
        println!("you> {}", question);
        println!("bot> {}\n", session.send(question).await);
    }

    Ok(())
}
