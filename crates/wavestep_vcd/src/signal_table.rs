//! Signal table mapping dump identifier codes to display names.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Maps the short identifier codes used in a dump to signal names.
///
/// Built once during header parsing and read-only afterwards. Codes are
/// opaque; each resolves to exactly one name, with last-write-wins on
/// redefinition to stay tolerant of slightly malformed dumps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalTable {
    names: IndexMap<String, String>,
}

impl SignalTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: IndexMap::new(),
        }
    }

    /// Register or overwrite a code-to-name mapping
    pub fn define(&mut self, code: &str, name: &str) {
        self.names.insert(code.to_string(), name.to_string());
    }

    /// Resolve a code to its signal name
    #[must_use]
    pub fn resolve(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    /// Number of registered signals
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if no signals are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate (code, name) pairs in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(c, n)| (c.as_str(), n.as_str()))
    }
}
