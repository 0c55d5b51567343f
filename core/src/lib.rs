//! Request construction and deferred dispatch for a Confluence-style REST API.
//!
//! # Overview
//! A `Query` is built from a declarative description (method, uri, optional
//! payload, optional headers). Construction normalizes the headers, applies
//! the method-specific rules and records one audit log entry. The resulting
//! `Runner` is later invoked with a caller-supplied `Transport`, which does
//! the actual network I/O (host-does-IO pattern).
//!
//! # Design
//! - Header normalization and runner selection are pure (`QueryBuilder::prepare`);
//!   logging goes through an injected `QueryLog`.
//! - The runner holds an immutable snapshot of uri, headers and body.
//! - Status codes are never interpreted; transport errors propagate unchanged.
//!
//! ```no_run
//! use confluence_query::{Query, QueryConfig};
//! use std::path::Path;
//!
//! # fn main() -> confluence_query::Result<()> {
//! let config = QueryConfig::load(Path::new("query.toml"))?;
//! let query = Query::builder("GET", "/rest/api/content")
//!     .header("expand", "body.storage,version")
//!     .build(&config)?;
//! # let _ = query;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod expand;
pub mod http;
pub mod log;
pub mod query;
pub mod transport;

pub use config::QueryConfig;
pub use error::{QueryError, Result};
pub use expand::parse_expand_attributes;
pub use http::{Headers, HttpMethod, HttpResponse, QueryResponse};
pub use log::{FileLog, LogEntry, MemoryLog, QueryLog};
pub use query::{Payload, Query, QueryBuilder, Runner};
pub use transport::Transport;
