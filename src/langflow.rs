//! Client for a Langflow flow's run endpoint.
//!
//! A flow takes one chat input plus a session id and answers with a deeply
//! nested JSON document whose shape depends on the flow's output
//! component. [`extract_text`] digs the human-readable answer out of it.

use std::time::Duration;
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;
use crate::error::LlmError;

pub const DEFAULT_API_URL: &str =
    "http://127.0.0.1:7860/api/v1/run/a8b894bc-5791-4eb9-a925-3a8136872944";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct RunRequest<'a> {
    output_type: &'static str,
    input_type:  &'static str,
    input_value: &'a str,
    session_id:  String,
}

impl<'a> RunRequest<'a> {
    /// A missing session id gets a fresh random one.
    pub(crate) fn chat(input_value: &'a str, session_id: Option<&str>) -> Self {
        Self {
            output_type: "chat",
            input_type:  "chat",
            input_value,
            session_id:  session_id
                .map(str::to_string)
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
        }
    }
}

pub struct LangflowClient {
    client:  reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl LangflowClient {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    /// Reads `LANGFLOW_API_URL` (with a local default) and `LANGFLOW_API_KEY`.
    /// A missing key is reported on the first call, not here.
    pub fn from_env() -> Result<Self, LlmError> {
        let url = std::env::var("LANGFLOW_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(url, std::env::var("LANGFLOW_API_KEY").ok())
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Runs the flow with one chat input. Returns the decoded JSON body, or
    /// `{"raw_text": body}` when the body is not JSON.
    pub async fn run(&self, user_message: &str, session_id: Option<&str>) -> Result<Value, LlmError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| LlmError::Config(
            "LANGFLOW_API_KEY environment variable is not set. Set it and re-run.".to_string(),
        ))?;

        let payload = RunRequest::chat(user_message, session_id);
        tracing::debug!(url = %self.api_url, session_id = %payload.session_id, "langflow run");

        let response = self.client
            .post(&self.api_url)
            .header("x-api-key", api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(LlmError::Api { status: status.as_u16(), body });
        }

        Ok(decode_body(body))
    }
}

pub(crate) fn decode_body(body: String) -> Value {
    match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_)    => json!({ "raw_text": body }),
    }
}

/// True for the hyphenated 8-4-4-4-12 hex form, ignoring surrounding whitespace.
pub fn is_uuid(s: &str) -> bool {
    let s = s.trim();
    s.len() == 36 && Uuid::try_parse(s).is_ok()
}

/// A non-empty, non-UUID string, trimmed.
fn usable(v: Option<&Value>) -> Option<String> {
    let s = v?.as_str()?;
    if s.is_empty() || is_uuid(s) {
        return None;
    }
    Some(s.trim().to_string())
}

/// JSON truthiness: null, false, zero and empty strings or containers are falsy.
fn truthy(v: &Value) -> bool {
    match v {
        Value::Null      => false,
        Value::Bool(b)   => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a)  => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// First truthy value among `keys` of `obj`. A truthy non-string still
/// wins here and is rejected later by [`usable`].
fn first_of<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| truthy(v))
}

fn from_output(out: &Value) -> Option<String> {
    if let Some(msg) = out.get("outputs").and_then(|o| o.get("message")).filter(|m| m.is_object()) {
        if let Some(text) = usable(first_of(msg, &["message", "text"])) {
            return Some(text);
        }
    }

    if let Some(first) = out.get("messages").and_then(Value::as_array).and_then(|m| m.first()) {
        if let Some(text) = usable(first.get("message")) {
            return Some(text);
        }
    }

    if let Some(text) = usable(out.get("artifacts").and_then(|a| a.get("message"))) {
        return Some(text);
    }

    let msg = out.get("results").and_then(|r| r.get("message")).filter(|m| m.is_object())?;
    if let Some(text) = usable(msg.get("data").and_then(|d| d.get("text"))) {
        return Some(text);
    }
    usable(first_of(msg, &["text", "default_value"]))
}

/// Lengths are in characters; the first string of a given length wins.
fn longest_string(value: &Value, longest: &mut String, longest_chars: &mut usize) {
    match value {
        Value::String(s) => {
            let s = s.trim();
            let chars = s.chars().count();
            if chars > 10 && chars > *longest_chars && !is_uuid(s) {
                *longest = s.to_string();
                *longest_chars = chars;
            }
        }
        Value::Array(items) => items.iter().for_each(|v| longest_string(v, longest, longest_chars)),
        Value::Object(map)  => map.values().for_each(|v| longest_string(v, longest, longest_chars)),
        _ => {}
    }
}

/// Extracts the human-readable answer from a Langflow run response.
///
/// Known output shapes are tried first, then the top-level
/// `message`/`text`/`output`/`result` keys, and finally the longest
/// non-UUID string over 10 characters anywhere in the document. Returns
/// an empty string when nothing qualifies.
pub fn extract_text(resp: &Value) -> String {
    if let Some(outputs) = resp.get("outputs").and_then(Value::as_array) {
        if let Some(text) = outputs.iter().filter(|o| o.is_object()).find_map(from_output) {
            return text;
        }
    }

    if resp.is_object() {
        for key in ["message", "text", "output", "result"] {
            if let Some(s) = resp.get(key).and_then(Value::as_str) {
                if !is_uuid(s) {
                    return s.trim().to_string();
                }
            }
        }
    }

    let mut longest = String::new();
    longest_string(resp, &mut longest, &mut 0);
    longest
}
