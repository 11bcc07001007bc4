//! Envbind - Schema-driven environment variable binding
//!
//! Envbind maps process environment variables onto a typed, validated
//! configuration object described by a declarative schema. Per schema field
//! it resolves which environment variable to read, fetches the raw string,
//! coerces and validates it, and aggregates every failure into one
//! descriptive error.
//!
//! # Architecture
//!
//! - **Snapshot** ([`snapshot`]): immutable capture of the environment,
//!   taken once per call
//! - **Resolver** ([`resolve`]): tag-or-case-probing name resolution
//! - **Schema** ([`schema`]): the tagged-variant node tree and field
//!   descriptors
//! - **Validator** ([`validator`]): the structural validation engine with
//!   collect-all semantics and an explicit description API
//! - **Binder** ([`binder`]): compilation plus the one-pass validation run
//!   behind the public entry points
//!
//! # Example
//!
//! ```
//! use envbind::{bind_snapshot, EnvSnapshot, Node};
//!
//! let env: EnvSnapshot = [("HOST", "localhost"), ("PORT", "8080")]
//!     .into_iter()
//!     .collect();
//!
//! let config = bind_snapshot(
//!     Node::object([("host", "HOST"), ("port", "PORT")]),
//!     &env,
//! )
//! .unwrap();
//!
//! assert_eq!(config["host"], "localhost");
//! assert_eq!(config["port"], "8080");
//! ```

pub mod binder;
pub mod error;
pub mod resolve;
pub mod schema;
pub mod snapshot;
pub mod validator;

mod compile;

// Re-export commonly used types for convenience
pub use binder::{bind, bind_snapshot, bind_value, load, load_snapshot, load_value};
pub use error::{EnvError, Result};
pub use resolve::{resolve_key, resolve_tagged, Binding};
pub use schema::{Field, Node};
pub use snapshot::EnvSnapshot;
pub use validator::{Description, Kind, Validator, Violation, ViolationKind};
