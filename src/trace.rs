use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub step:      usize,
    pub node:      String,
    pub event:     String,
    pub data:      String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Trace {
    entries: Vec<TraceEntry>,
}

impl Trace {
    pub fn new() -> Self { Self { entries: Vec::new() } }

    pub fn record(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }

    /// Records an event for `node` at `step`, stamped with the current time.
    pub fn log(&mut self, step: usize, node: &str, event: &str, data: &str) {
        tracing::debug!(step, node, event, data, "graph trace");
        self.record(TraceEntry {
            step,
            node:      node.to_string(),
            event:     event.to_string(),
            data:      data.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns all entries for a given node name
    pub fn for_node(&self, node: &str) -> Vec<&TraceEntry> {
        self.entries.iter().filter(|e| e.node == node).collect()
    }

    /// Serializes the trace to a pretty-printed JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.entries)
            .unwrap_or_else(|_| "[]".to_string())
    }

    /// Prints a human-readable trace table to stdout
    pub fn print(&self) {
        println!("\n{:<6} {:<14} {:<20} {}", "step", "node", "event", "data");
        println!("{}", "─".repeat(80));
        for e in &self.entries {
            println!("{:<6} {:<14} {:<20} {}", e.step, e.node, e.event, &e.data.chars().take(40).collect::<String>());
        }
    }
}
