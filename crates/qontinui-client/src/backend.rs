//! The seam between request construction and the wire
//!
//! [`QontinuiClient`](crate::QontinuiClient) builds [`ApiRequest`]s and hands them to
//! a [`Backend`] together with the token snapshot. [`HttpBackend`](crate::HttpBackend)
//! is the production implementation; tests substitute recording or in-memory backends.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::Result;

/// Body of an outbound request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    None,
    Json(Value),
    /// `application/x-www-form-urlencoded` pairs
    Form(Vec<(String, String)>),
}

/// One request against the backend, relative to its base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute path starting with `/`, already percent-encoded
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn with_form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(pairs);
        self
    }

    /// Query value for `key`, if present.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// JSON body, if the request carries one.
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// Something that can execute [`ApiRequest`]s.
///
/// Implementations return the parsed JSON body on 2xx (`{}` for an empty body) and
/// [`Error::Remote`](crate::Error::Remote) otherwise. Dropping the returned future
/// must abort the request.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn send(&self, request: ApiRequest, token: Option<&str>) -> Result<Value>;
}
