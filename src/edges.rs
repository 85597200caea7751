use std::collections::{HashMap, HashSet};

/// Pseudo-node every invocation begins at.
pub const START: &str = "__start__";
/// Pseudo-node that ends an invocation.
pub const END: &str = "__end__";

/// Directed edges of a compiled graph: source node → next node.
///
/// Every source has exactly one successor, so a graph is a chain from
/// [`START`] to [`END`]. Any lookup that misses is a bug in compilation,
/// which rejects graphs with dangling nodes.
#[derive(Debug, Clone, Default)]
pub struct EdgeTable {
    next: HashMap<String, String>,
}

impl EdgeTable {
    pub fn new() -> Self {
        Self { next: HashMap::new() }
    }

    /// Inserts `from → to`. Returns the previous target if `from` already had one.
    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) -> Option<String> {
        self.next.insert(from.into(), to.into())
    }

    pub fn next(&self, from: &str) -> Option<&str> {
        self.next.get(from).map(|s| s.as_str())
    }

    pub fn has_source(&self, from: &str) -> bool {
        self.next.contains_key(from)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.next.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Walks the chain from [`START`]. Returns true if it reaches [`END`]
    /// without revisiting a node.
    pub fn reaches_end(&self) -> bool {
        let mut seen = HashSet::new();
        let mut current = START;
        while let Some(next) = self.next(current) {
            if next == END {
                return true;
            }
            if !seen.insert(next) {
                return false;
            }
            current = next;
        }
        false
    }
}

pub fn is_reserved(name: &str) -> bool {
    name == START || name == END
}
