//! # sqlx-params
//!
//! SQL query parameter helpers for SQLx: `IN (...)` list expansion, `?` to
//! `$n` rebinding, and literal query rendering for logs.
//!
//! ## Features
//!
//! - **List Expansion**: [`expand_in`] rewrites a single `?` bound to a list
//!   argument into one placeholder per element and flattens the argument
//!   list for driver execution
//! - **Rebinding**: [`rebind`] renumbers `?` placeholders into `$1, $2, ...`
//!   for dialects that require them
//! - **Literal Rendering**: [`inline`] substitutes arguments into a query as
//!   escaped SQL literals for logging and debugging, across `?`, `$n`, and
//!   `:name` placeholder styles
//! - **Typed Values**: a single [`Value`] argument type with `From`
//!   conversions for primitives, options, byte buffers, timestamps, and
//!   vectors, plus [`SqlValuer`]/[`SqlStringer`] capability traits for
//!   domain types
//! - **Executor Glue**: [`ExpandedQuery`] and [`ExpandedQueryAs`] bind the
//!   flattened arguments to a fresh SQLx MySQL query on each execution
//!
//! ## Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! sqlx = { version = "0.8", features = ["mysql", "runtime-tokio"] }
//! sqlx-params = "0.1"
//! ```
//!
//! ## Examples
//!
//! ### Expanding an `IN` clause
//!
//! ```rust
//! use sqlx_params::{expand_in, params};
//!
//! let (query, args) = expand_in(
//!     "SELECT id FROM t WHERE id IN (?) AND pid = ?",
//!     params![vec![1, 2, 3], 5],
//! )?;
//! assert_eq!(query, "SELECT id FROM t WHERE id IN (?, ?, ?) AND pid = ?");
//! assert_eq!(args, params![1, 2, 3, 5]);
//! # Ok::<(), sqlx_params::Error>(())
//! ```
//!
//! ### Rebinding for numbered dialects
//!
//! ```rust
//! use sqlx_params::rebind;
//!
//! let query = rebind("SELECT id FROM t WHERE id IN (?, ?, ?) AND pid = ?");
//! assert_eq!(query, "SELECT id FROM t WHERE id IN ($1, $2, $3) AND pid = $4");
//! ```
//!
//! ### Rendering a query for a log line
//!
//! ```rust
//! use sqlx_params::{inline, params};
//!
//! assert_eq!(inline("$1, $2", &params![123, "test string"]), "123, 'test string'");
//! assert_eq!(inline("$1", &params![vec![1, 2, 3]]), "ARRAY[1, 2, 3]");
//!
//! // a query without any recognizable placeholder degrades loudly
//! assert_eq!(
//!     inline("SELECT 1 FROM t", &params![]),
//!     "placeholder is undefined: SELECT 1 FROM t"
//! );
//! ```
//!
//! ### Executing an expanded query
//!
//! ```rust,no_run
//! use sqlx::MySqlPool;
//! use sqlx_params::{params, ExpandedQuery};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = MySqlPool::connect("mysql://localhost/test").await?;
//!
//! let query = ExpandedQuery::new(
//!     "UPDATE users SET active = ? WHERE id IN (?)",
//!     params![true, vec![1, 2, 3]],
//! )?;
//! query.execute(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## How It Works
//!
//! The literal-rendering path classifies the argument list (independent
//! positional arguments, a single record expanded field by field, or a
//! string-keyed map expanded key by key), encodes each value as an escaped
//! SQL literal, detects the query's placeholder style once, and rewrites the
//! text in a single pass. Substituted output is never re-scanned, and
//! placeholders with no matching argument are left untouched, so the
//! rendering stays safe to call from logging code that must not fail.
//!
//! The execution-binding path is independent: [`expand_in`] walks `?`
//! placeholders in lock-step with the argument list and splices list
//! elements into both the query text and the flattened argument list, which
//! [`ExpandedQuery`] then binds to SQLx.
//!
//! ## Limitations
//!
//! - The executor glue currently targets MySQL only
//! - Queries are not parsed: a `?` inside a string literal counts as a
//!   placeholder, and malformed SQL is rewritten without complaint
//! - [`inline`] escapes quotes but offers no injection-safety guarantee; it
//!   is for debug output, never for building queries sent to a server
//!
//! ## License
//!
//! Licensed under either of Apache License, Version 2.0 or MIT license at
//! your option.

pub mod error;
pub mod expand;
pub mod inline;
pub mod query;
pub mod query_as;
pub mod value;

pub use error::{Error, Result};
pub use expand::{expand_in, rebind};
pub use inline::inline;
pub use query::ExpandedQuery;
pub use query_as::ExpandedQueryAs;
pub use value::{SqlStringer, SqlValuer, Value, ValuerError};

/// Convenience re-exports for common use cases
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::expand::{expand_in, rebind};
    pub use crate::inline::inline;
    pub use crate::params;
    pub use crate::query::ExpandedQuery;
    pub use crate::query_as::ExpandedQueryAs;
    pub use crate::value::{SqlStringer, SqlValuer, Value, ValuerError};
}
