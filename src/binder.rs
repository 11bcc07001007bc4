//! Public binding entry points.
//!
//! Two modes share the same compilation and validation pipeline and differ
//! only in their error banner:
//!
//! - [`bind`] / [`bind_value`] / [`bind_snapshot`] — the inference binder,
//!   which resolves names by tag or case-insensitive key probing and reports
//!   failures under `Some environment variables are missing:`.
//! - [`load`] / [`load_value`] / [`load_snapshot`] — the self-contained
//!   loader for string and descriptor schemas, reporting under
//!   `Invalid environment:`.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::compile::compile;
use crate::error::{EnvError, Result};
use crate::schema::Node;
use crate::snapshot::EnvSnapshot;

const BIND_BANNER: &str = "Some environment variables are missing:";
const LOAD_BANNER: &str = "Invalid environment:";

fn run(node: &Node, env: &EnvSnapshot, banner: &str) -> Result<Value> {
    let compiled = compile(node, env)?;
    compiled
        .validator
        .validate(&compiled.values)
        .map_err(|details| EnvError::validation(banner, details))
}

/// Bind a schema against an explicit snapshot (inference mode)
pub fn bind_snapshot(schema: impl Into<Node>, env: &EnvSnapshot) -> Result<Value> {
    run(&schema.into(), env, BIND_BANNER)
}

/// Bind a schema against the process environment (inference mode)
pub fn bind_value(schema: impl Into<Node>) -> Result<Value> {
    bind_snapshot(schema, &EnvSnapshot::from_process())
}

/// Bind a schema against the process environment and deserialize the result
pub fn bind<T: DeserializeOwned>(schema: impl Into<Node>) -> Result<T> {
    Ok(serde_json::from_value(bind_value(schema)?)?)
}

/// Load a schema against an explicit snapshot (loader mode)
pub fn load_snapshot(schema: impl Into<Node>, env: &EnvSnapshot) -> Result<Value> {
    run(&schema.into(), env, LOAD_BANNER)
}

/// Load a schema against the process environment (loader mode)
pub fn load_value(schema: impl Into<Node>) -> Result<Value> {
    load_snapshot(schema, &EnvSnapshot::from_process())
}

/// Load a schema against the process environment and deserialize the result
pub fn load<T: DeserializeOwned>(schema: impl Into<Node>) -> Result<T> {
    Ok(serde_json::from_value(load_value(schema)?)?)
}
