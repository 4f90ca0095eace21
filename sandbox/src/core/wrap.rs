//! Source wrapping into a zero-argument callable.

use crate::core::types::{SourceKind, SourceUnit};

/// Wrap source text in an arrow function the loader can call.
///
/// The wrapper adds no leading lines, so engine line numbers match the file.
/// The closing token sits on its own line so a trailing `//` comment cannot
/// swallow it.
pub fn wrap_source(unit: &SourceUnit) -> String {
    match unit.kind {
        SourceKind::Statements => format!("() => {{ {}\n}};", unit.text),
        SourceKind::Expression => format!("() => ( {}\n);", expression_body(&unit.text)),
    }
}

fn expression_body(text: &str) -> &str {
    let trimmed = text.trim_end();
    trimmed.strip_suffix(';').unwrap_or(trimmed)
}
