//! Canonical value form for deep equality of call results.
//!
//! The engine serializes both values with `JSON.stringify`; the text is then
//! parsed into a `serde_json::Value`, whose maps are ordered by key, so two
//! aggregates with the same contents compare equal regardless of identity or
//! property insertion order. The engine's text is kept for display.

use std::fmt;

use serde_json::Value;

#[derive(Debug, Clone)]
pub enum Canonical {
    /// `JSON.stringify` produced no JSON (undefined, functions, symbols).
    Undefined,
    Json { text: String, value: Value },
}

impl Canonical {
    pub fn from_json_text(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(value) => Canonical::Json {
                text: text.to_string(),
                value,
            },
            Err(_) => Canonical::Undefined,
        }
    }
}

impl PartialEq for Canonical {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Canonical::Undefined, Canonical::Undefined) => true,
            (Canonical::Json { value: left, .. }, Canonical::Json { value: right, .. }) => {
                left == right
            }
            _ => false,
        }
    }
}

impl Eq for Canonical {}

impl fmt::Display for Canonical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Canonical::Undefined => write!(f, "undefined"),
            Canonical::Json { text, .. } => write!(f, "{text}"),
        }
    }
}
