//! HTTP data types shared by the query core and its transports.
//!
//! # Design
//! Requests and responses are plain data. The core never touches the
//! network; a `Transport` supplied by the caller turns a normalized request
//! into an `HttpResponse`, which the runner wraps into a `QueryResponse`.
//!
//! All fields use owned types so values can be snapshotted and handed to
//! transports without lifetime concerns.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;

use crate::error::{QueryError, Result};

/// Header map sent alongside a request, keyed by header name.
pub type Headers = BTreeMap<String, String>;

pub const LIMIT: &str = "limit";
pub const ACCEPT: &str = "accept";
pub const EXPAND: &str = "expand";
pub const CONTENT_TYPE: &str = "content_type";

pub const APPLICATION_JSON: &str = "application/json";

/// Renders headers as `{name=value, ...}` on a single line. Control
/// characters in names and values are escaped.
pub(crate) struct DisplayHeaders<'a>(pub &'a Headers);

impl fmt::Display for DisplayHeaders<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", name.escape_debug(), value.escape_debug())?;
        }
        f.write_str("}")
    }
}

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Delete,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "DELETE" => Ok(HttpMethod::Delete),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            _ => Err(QueryError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// An HTTP response described as plain data, as returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Normalized result of running a query.
///
/// The runner never interprets the status code; `is_success` and `json` are
/// conveniences for callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl QueryResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup. Returns the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(QueryError::Deserialization)
    }
}

impl From<HttpResponse> for QueryResponse {
    fn from(response: HttpResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers,
            body: response.body,
        }
    }
}
