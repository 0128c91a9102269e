// HTTP request and response types

use crate::Extensions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP request wrapper, handed to every pipeline stage and bound operation.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub query_params: HashMap<String, String>,
    /// Request-scoped typed state (claims, tenant id, scoped store).
    pub extensions: Extensions,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: HashMap::new(),
            body: Vec::new(),
            query_params: HashMap::new(),
            extensions: Extensions::new(),
        }
    }

    /// Header lookup trying the name as given, then lower-cased.
    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers
            .get(name)
            .or_else(|| self.headers.get(&name.to_ascii_lowercase()))
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn query(&self, name: &str) -> Option<&String> {
        self.query_params.get(name)
    }

    /// Parse the request body as JSON.
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> Result<T, crate::Error> {
        serde_json::from_slice(&self.body).map_err(|e| crate::Error::Deserialization(e.to_string()))
    }
}

/// HTTP response wrapper.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn not_found() -> Self {
        Self::new(404)
    }

    pub fn internal_server_error() -> Self {
        Self::new(500)
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self, crate::Error> {
        self.body =
            serde_json::to_vec(value).map_err(|e| crate::Error::Serialization(e.to_string()))?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    /// Failure body `{code, msg}` with the HTTP status mirroring the code.
    pub fn failure(code: u16, msg: impl Into<String>) -> Self {
        let reply = Reply {
            code,
            msg: msg.into(),
            data: None,
        };
        Self::new(code)
            .with_json(&reply)
            .unwrap_or_else(|_| Self::internal_server_error())
    }
}

/// Application-level reply envelope: `{code, msg, data?}`.
///
/// Business failures travel as HTTP 200 with a non-200 `code`; transport
/// failures use [`HttpResponse::failure`] where the status mirrors the code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reply {
    pub code: u16,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Reply {
    pub fn ok(data: serde_json::Value) -> HttpResponse {
        let reply = Reply {
            code: 200,
            msg: "ok".to_string(),
            data: Some(data),
        };
        HttpResponse::ok()
            .with_json(&reply)
            .unwrap_or_else(|_| HttpResponse::internal_server_error())
    }

    /// Business-logic failure: HTTP 200 carrying an application error code.
    pub fn fail(code: u16, msg: impl Into<String>) -> HttpResponse {
        let reply = Reply {
            code,
            msg: msg.into(),
            data: None,
        };
        HttpResponse::ok()
            .with_json(&reply)
            .unwrap_or_else(|_| HttpResponse::internal_server_error())
    }
}
