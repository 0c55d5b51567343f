//! Construction and deferred execution of a single API call.
//!
//! # Design
//! `QueryBuilder::prepare` is pure: it defaults the headers, applies the
//! method-specific rules and snapshots everything the call needs into a
//! `Runner`. Logging is a separate step (`build_with_log` / `build`) so the
//! normalization can be tested without a filesystem.
//!
//! The runner owns its own copy of uri, headers and body. Running it twice
//! sends the same request twice; nothing is re-normalized on invocation.

use std::fmt;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::config::QueryConfig;
use crate::error::{QueryError, Result};
use crate::expand::parse_expand_attributes;
use crate::http::{
    DisplayHeaders, Headers, HttpMethod, QueryResponse, ACCEPT, APPLICATION_JSON, CONTENT_TYPE, EXPAND, LIMIT,
};
use crate::log::{FileLog, LogEntry, QueryLog};
use crate::transport::Transport;

/// Request body as stored on a constructed query.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The caller's value, untouched.
    Json(Value),
    /// JSON text, as sent by POST.
    Encoded(String),
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Json(value) => write!(f, "{value}"),
            Payload::Encoded(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Get,
    Delete,
    Post { body: String },
    Put { body: Option<Value> },
    Unsupported,
}

/// Deferred call produced at construction. Invoke with a transport.
#[derive(Debug, Clone)]
pub struct Runner {
    id: Uuid,
    method: String,
    uri: String,
    headers: Headers,
    call: Call,
}

impl Runner {
    pub fn run<T: Transport + ?Sized>(&self, transport: &T) -> Result<QueryResponse> {
        let response = match &self.call {
            Call::Get => transport.get(&self.uri, &self.headers),
            Call::Delete => transport.delete(&self.uri, &self.headers),
            Call::Post { body } => transport.post(&self.uri, body, &self.headers),
            Call::Put { body } => transport.put(&self.uri, body.as_ref(), &self.headers),
            Call::Unsupported => return Err(QueryError::UnsupportedMethod(self.method.clone())),
        }
        .map_err(|e| QueryError::Transport(Box::new(e)))?;

        println!(
            "TASK INFO: [{}] request to '{}' returned {} response code.",
            self.method, self.uri, response.status
        );
        tracing::info!(
            query_id = %self.id,
            method = %self.method,
            uri = %self.uri,
            status = response.status,
            "query completed"
        );
        Ok(response.into())
    }
}

/// A constructed, not yet executed API call.
#[derive(Debug, Clone)]
pub struct Query {
    id: Uuid,
    method: String,
    uri: String,
    payload: Option<Payload>,
    headers: Headers,
    runner: Runner,
}

impl Query {
    pub fn builder(method: impl Into<String>, uri: impl Into<String>) -> QueryBuilder {
        QueryBuilder {
            method: method.into(),
            uri: uri.into(),
            payload: None,
            headers: Headers::new(),
        }
    }

    /// Correlates the audit record with the runner's tracing events.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Upper-case method name, or the caller's string if unsupported.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    pub fn run<T: Transport + ?Sized>(&self, transport: &T) -> Result<QueryResponse> {
        self.runner.run(transport)
    }

    pub fn log_entry(&self) -> LogEntry {
        LogEntry {
            id: self.id,
            timestamp: Utc::now(),
            method: self.method.clone(),
            uri: self.uri.clone(),
            headers: self.headers.clone(),
            payload: self.payload.clone(),
        }
    }

    /// Print the query to stdout for debugging.
    pub fn describe(&self) {
        println!("{self}");
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "method: {}", self.method)?;
        writeln!(f, "uri: {}", self.uri)?;
        match &self.payload {
            Some(payload) => writeln!(f, "payload: {payload}")?,
            None => writeln!(f, "payload: -")?,
        }
        write!(f, "headers: {}", DisplayHeaders(&self.headers))
    }
}

/// Payload as converted by the builder; conversion errors wait for `prepare`.
type PendingPayload = Option<std::result::Result<Value, serde_json::Error>>;

/// Declarative description of a query.
///
/// A payload that fails to serialize is kept as an error. POST and PUT
/// report it when the builder is finished; GET and DELETE never send a body
/// and drop it.
#[derive(Debug)]
pub struct QueryBuilder {
    method: String,
    uri: String,
    payload: PendingPayload,
    headers: Headers,
}

impl QueryBuilder {
    pub fn payload<T: Serialize + ?Sized>(mut self, payload: &T) -> Self {
        self.payload = Some(serde_json::to_value(payload));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.headers.insert(name.into(), value.to_string());
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: ToString,
    {
        for (name, value) in headers {
            self.headers.insert(name.into(), value.to_string());
        }
        self
    }

    /// Normalize headers and select the runner. No I/O.
    pub fn prepare(self, config: &QueryConfig) -> Result<Query> {
        let mut headers = process_headers(self.headers, config)?;
        let payload = self.payload;

        let (method, call, payload) = match self.method.parse::<HttpMethod>() {
            Ok(HttpMethod::Get) => {
                let expand = parse_expand_attributes(headers.get(EXPAND).map(String::as_str));
                headers.insert(EXPAND.to_string(), expand);
                (HttpMethod::Get.to_string(), Call::Get, unsent_payload(payload))
            }
            Ok(HttpMethod::Delete) => (
                HttpMethod::Delete.to_string(),
                Call::Delete,
                unsent_payload(payload),
            ),
            Ok(HttpMethod::Post) => {
                headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());
                let value = payload.transpose().map_err(QueryError::Serialization)?;
                let body = serde_json::to_string(&value.unwrap_or(Value::Null))
                    .map_err(QueryError::Serialization)?;
                (
                    HttpMethod::Post.to_string(),
                    Call::Post { body: body.clone() },
                    Some(Payload::Encoded(body)),
                )
            }
            Ok(HttpMethod::Put) => {
                headers.insert(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string());
                let payload = payload.transpose().map_err(QueryError::Serialization)?;
                (
                    HttpMethod::Put.to_string(),
                    Call::Put { body: payload.clone() },
                    payload.map(Payload::Json),
                )
            }
            Err(_) => {
                tracing::warn!(method = %self.method, uri = %self.uri, "unsupported query method");
                (self.method, Call::Unsupported, unsent_payload(payload))
            }
        };

        let id = Uuid::new_v4();
        let runner = Runner {
            id,
            method: method.clone(),
            uri: self.uri.clone(),
            headers: headers.clone(),
            call,
        };
        Ok(Query {
            id,
            method,
            uri: self.uri,
            payload,
            headers,
            runner,
        })
    }

    /// Prepare the query and record it in `log`.
    pub fn build_with_log(self, config: &QueryConfig, log: &dyn QueryLog) -> Result<Query> {
        let query = self.prepare(config)?;
        log.record(&query.log_entry())?;
        Ok(query)
    }

    /// Prepare the query and append it to the configured log file.
    pub fn build(self, config: &QueryConfig) -> Result<Query> {
        let log = FileLog::from_config(config)?;
        self.build_with_log(config, &log)
    }
}

/// Payload kept for GET, DELETE and unsupported methods. It is never sent,
/// so a value that failed to serialize is dropped instead of failing.
fn unsent_payload(payload: PendingPayload) -> Option<Payload> {
    match payload? {
        Ok(value) => Some(Payload::Json(value)),
        Err(e) => {
            tracing::debug!(error = %e, "dropping unserializable payload of a bodiless query");
            None
        }
    }
}

/// Default `limit` from config and `accept` to JSON. Other headers pass
/// through untouched.
fn process_headers(mut headers: Headers, config: &QueryConfig) -> Result<Headers> {
    if !headers.contains_key(LIMIT) {
        headers.insert(LIMIT.to_string(), config.default_page_limit()?.to_string());
    }
    headers
        .entry(ACCEPT.to_string())
        .or_insert_with(|| APPLICATION_JSON.to_string());
    Ok(headers)
}
