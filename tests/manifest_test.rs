use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use chatgraph::llm::MockChatModel;
use chatgraph::manifest::GraphEntrypoint;
use chatgraph::{
    chatbot_graph, AppConfig, ChatState, CompiledGraph, DeploymentManifest, GraphError,
    GraphRegistry, Provider,
};
use tempfile::NamedTempFile;

const MANIFEST: &str = r#"{
    "dependencies": ["."],
    "graphs": { "agent": "src/manifest.rs:chatbot", "echo": "tests/manifest_test.rs:echo" },
    "env": ".env"
}"#;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

fn echo_graph(_config: &AppConfig) -> Result<CompiledGraph, GraphError> {
    chatbot_graph(Arc::new(MockChatModel::replying(&["echo"])), "", "")
}

// ─────────────────────────────────────────────────────────────────────────────
// Manifest
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_manifest_parses_and_resolves_entrypoints() {
    let manifest = DeploymentManifest::from_json(MANIFEST).unwrap();

    assert_eq!(manifest.dependencies, vec!["."]);
    assert_eq!(manifest.env.as_deref(), Some(".env"));
    assert_eq!(manifest.entrypoint("agent").unwrap(), GraphEntrypoint {
        path:   "src/manifest.rs".to_string(),
        symbol: "chatbot".to_string(),
    });
}

#[test]
fn test_manifest_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(MANIFEST.as_bytes()).unwrap();

    let manifest = DeploymentManifest::load(file.path()).unwrap();
    assert_eq!(manifest.graphs.len(), 2);

    let missing = DeploymentManifest::load(file.path().with_extension("missing"));
    assert!(matches!(missing, Err(GraphError::Manifest(_))));
}

#[test]
fn test_manifest_rejects_bad_input() {
    assert!(matches!(DeploymentManifest::from_json("not json"), Err(GraphError::Manifest(_))));
    assert!(matches!(DeploymentManifest::from_json(r#"{ "graphs": {} }"#), Err(GraphError::Manifest(_))));

    let manifest = DeploymentManifest::from_json(r#"{ "graphs": { "a": "no-symbol", "b": "path:" } }"#).unwrap();
    assert!(matches!(manifest.entrypoint("a"), Err(GraphError::Manifest(_))));
    assert!(matches!(manifest.entrypoint("b"), Err(GraphError::Manifest(_))));

    match manifest.entrypoint("zzz") {
        Err(GraphError::Manifest(msg)) => assert!(msg.contains("available: a, b"), "{msg}"),
        other => panic!("expected manifest error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_registry_resolves_custom_symbol() {
    let manifest = DeploymentManifest::from_json(MANIFEST).unwrap();
    let mut registry = GraphRegistry::with_builtins();
    registry.register("echo", echo_graph);

    let graph = registry.resolve(&manifest, "echo", &AppConfig::default()).unwrap();
    let state = graph.invoke(ChatState::from_user("hi")).await.unwrap();
    assert_eq!(state.last_reply().unwrap().content, "echo");
}

#[test]
fn test_registry_builds_builtin_chatbot_offline() {
    let manifest = DeploymentManifest::from_json(MANIFEST).unwrap();
    let config = AppConfig::from_lookup(lookup(&[
        ("OPENAI_API_KEY", "sk-test"),
        ("CHATGRAPH_RECURSION_LIMIT", "7"),
    ])).unwrap();

    let graph = GraphRegistry::with_builtins().resolve(&manifest, "agent", &config).unwrap();
    assert_eq!(graph.node_names(), &["chatbot".to_string()]);
    assert_eq!(graph.config().recursion_limit, 7);
}

#[test]
fn test_registry_reports_unknown_symbol_and_missing_key() {
    let manifest = DeploymentManifest::from_json(MANIFEST).unwrap();
    let registry = GraphRegistry::with_builtins();
    assert!(registry.has("chatbot"));
    assert!(!registry.has("echo"));

    let err = registry.resolve(&manifest, "echo", &AppConfig::default()).err().unwrap();
    assert!(matches!(err, GraphError::Manifest(_)), "{err}");

    let err = registry.resolve(&manifest, "agent", &AppConfig::default()).err().unwrap();
    assert!(matches!(err, GraphError::Config(_)), "{err}");
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_defaults() {
    let config = AppConfig::from_lookup(lookup(&[])).unwrap();

    assert_eq!(config.provider, Provider::OpenAi);
    assert_eq!(config.model, "");
    assert_eq!(config.max_retries, 2);
    assert_eq!(config.recursion_limit, 25);
    assert_eq!(config.langflow_api_url, chatgraph::langflow::DEFAULT_API_URL);
    assert!(config.openai_api_key.is_none());
}

#[test]
fn test_config_reads_every_variable() {
    let config = AppConfig::from_lookup(lookup(&[
        ("CHATGRAPH_PROVIDER", "Anthropic"),
        ("CHATGRAPH_MODEL", "claude-x"),
        ("CHATGRAPH_SYSTEM_PROMPT", "Be kind."),
        ("CHATGRAPH_MAX_RETRIES", "5"),
        ("ANTHROPIC_API_KEY", "sk-ant"),
        ("LANGFLOW_API_URL", "http://flow/run/1"),
        ("LANGFLOW_API_KEY", ""),
    ])).unwrap();

    assert_eq!(config.provider, Provider::Anthropic);
    assert_eq!(config.model, "claude-x");
    assert_eq!(config.system_prompt, "Be kind.");
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-ant"));
    assert_eq!(config.langflow_api_url, "http://flow/run/1");
    assert!(config.langflow_api_key.is_none(), "empty values count as unset");

    assert_eq!(config.chat_model().unwrap().provider(), "anthropic");
}

#[test]
fn test_config_rejects_bad_values() {
    let err = AppConfig::from_lookup(lookup(&[("CHATGRAPH_PROVIDER", "bard")])).unwrap_err();
    assert!(matches!(err, GraphError::Config(_)));

    let err = AppConfig::from_lookup(lookup(&[("CHATGRAPH_MAX_RETRIES", "lots")])).unwrap_err();
    assert!(err.to_string().contains("CHATGRAPH_MAX_RETRIES"));
}

#[test]
fn test_config_debug_redacts_secrets() {
    let config = AppConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-very-secret")])).unwrap();
    let debug = format!("{config:?}");
    assert!(!debug.contains("sk-very-secret"));
    assert!(debug.contains("<redacted>"));
}

#[test]
fn test_langflow_provider_has_no_chat_model() {
    let config = AppConfig::from_lookup(lookup(&[("CHATGRAPH_PROVIDER", "langflow")])).unwrap();
    assert!(matches!(config.chat_model(), Err(GraphError::Config(_))));
    assert!(config.langflow_client().is_ok());
}
