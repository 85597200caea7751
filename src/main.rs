//! `chatgraph` — serve a manifest-declared chat graph on the terminal.
//!
//! ```bash
//! OPENAI_API_KEY=sk-... chatgraph chat
//! CHATGRAPH_PROVIDER=anthropic ANTHROPIC_API_KEY=... chatgraph ask "What is Rust?"
//! CHATGRAPH_PROVIDER=langflow LANGFLOW_API_KEY=... chatgraph chat
//! RUST_LOG=chatgraph=debug chatgraph chat
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Context;
use chatgraph::{
    AppConfig, ChatBackend, ChatSession, DeploymentManifest, GraphBackend, GraphRegistry,
    LangflowBackend, Provider,
};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "chatgraph", version, about = "Chat with a single-node conversational graph")]
struct Cli {
    /// Deployment manifest naming the graph entrypoints
    #[arg(long, default_value = "chatgraph.json")]
    manifest: PathBuf,

    /// Graph to serve, by its manifest name
    #[arg(long, default_value = "agent")]
    graph: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive conversation over stdin; `/reset` starts a new session, `/quit` exits
    Chat,
    /// Send one message and print the answer
    Ask {
        prompt: String,
    },
}

fn backend(cli: &Cli, config: &AppConfig) -> anyhow::Result<Arc<dyn ChatBackend>> {
    if config.provider == Provider::Langflow {
        return Ok(Arc::new(LangflowBackend::new(config.langflow_client()?)));
    }

    let manifest = DeploymentManifest::load(&cli.manifest)
        .with_context(|| format!("loading manifest {}", cli.manifest.display()))?;
    let graph = GraphRegistry::with_builtins()
        .resolve(&manifest, &cli.graph, config)
        .with_context(|| format!("resolving graph '{}'", cli.graph))?;
    Ok(Arc::new(GraphBackend::new(graph)))
}

async fn repl(mut session: ChatSession) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("session {} — type /quit to exit, /reset to start over", session.id());
    loop {
        stdout.write_all(b"you> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else { break };
        let input = line.trim();
        match input {
            ""      => continue,
            "/quit" => break,
            "/reset" => {
                session.clear();
                println!("new session {}", session.id());
                continue;
            }
            _ => {}
        }

        let answer = session.send(input).await;
        println!("bot> {}\n", answer);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    let session = ChatSession::new(backend(&cli, &config)?);

    match cli.command {
        Command::Chat => repl(session).await?,
        Command::Ask { prompt } => {
            let mut session = session;
            println!("{}", session.send(prompt).await);
        }
    }

    Ok(())
}
