//! The I/O seam between the query core and the network.
//!
//! # Design
//! The caller owns the connection. A `Transport` receives the normalized
//! uri, headers and body exactly as computed at construction and returns a
//! raw `HttpResponse`. Timeouts, retries, pooling and authentication all
//! belong to the implementation, never to the core.

use serde_json::Value;

use crate::http::{Headers, HttpResponse};

/// Executes HTTP calls on behalf of a query runner.
pub trait Transport {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get(&self, uri: &str, headers: &Headers) -> Result<HttpResponse, Self::Error>;

    fn delete(&self, uri: &str, headers: &Headers) -> Result<HttpResponse, Self::Error>;

    /// `body` is already JSON text.
    fn post(&self, uri: &str, body: &str, headers: &Headers) -> Result<HttpResponse, Self::Error>;

    /// `body` is handed over as supplied by the caller, not pre-encoded.
    fn put(
        &self,
        uri: &str,
        body: Option<&Value>,
        headers: &Headers,
    ) -> Result<HttpResponse, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &T {
    type Error = T::Error;

    fn get(&self, uri: &str, headers: &Headers) -> Result<HttpResponse, Self::Error> {
        (**self).get(uri, headers)
    }

    fn delete(&self, uri: &str, headers: &Headers) -> Result<HttpResponse, Self::Error> {
        (**self).delete(uri, headers)
    }

    fn post(&self, uri: &str, body: &str, headers: &Headers) -> Result<HttpResponse, Self::Error> {
        (**self).post(uri, body, headers)
    }

    fn put(
        &self,
        uri: &str,
        body: Option<&Value>,
        headers: &Headers,
    ) -> Result<HttpResponse, Self::Error> {
        (**self).put(uri, body, headers)
    }
}
