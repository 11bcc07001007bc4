//! Environment variable name resolution.
//!
//! Given a schema field key, decide which actual environment variable backs
//! it. An explicit tag always wins verbatim; otherwise the key is probed
//! against the snapshot in a fixed case order.

use crate::snapshot::EnvSnapshot;

/// A resolved (name, value) pair for one schema field.
///
/// When no candidate is defined, `name` falls back to the original key so
/// error messages can still reference something meaningful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// The environment variable name the field resolved to
    pub name: String,
    /// The raw value, or `None` when the variable is not defined
    pub value: Option<String>,
}

/// Resolve a field key by case probing: exact, then upper-cased, then
/// lower-cased. The first defined candidate wins.
pub fn resolve_key(env: &EnvSnapshot, key: &str) -> Binding {
    for candidate in [key.to_string(), key.to_uppercase(), key.to_lowercase()] {
        if let Some(value) = env.get(&candidate) {
            tracing::trace!(key, name = %candidate, "resolved environment variable");
            return Binding {
                name: candidate,
                value: Some(value.to_string()),
            };
        }
    }
    tracing::trace!(key, "no environment variable defined for key");
    Binding {
        name: key.to_string(),
        value: None,
    }
}

/// Resolve with an optional explicit tag.
///
/// A tag is used verbatim, exact case, and suppresses key probing entirely:
/// a tagged field whose variable is unset stays unset even if some case
/// variant of the key happens to be defined.
pub fn resolve_tagged(env: &EnvSnapshot, key: &str, tag: Option<&str>) -> Binding {
    match tag {
        Some(name) => Binding {
            name: name.to_string(),
            value: env.get(name).map(str::to_string),
        },
        None => resolve_key(env, key),
    }
}
