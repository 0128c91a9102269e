// Capability contracts for Chassis plugins
//
// Plugins are capability objects: the framework asks each kind for the
// operations it exposes instead of requiring a wide base interface.

use crate::{Error, HttpRequest, HttpResponse};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Typed handler bound to a controller operation. The request context is the
/// sole argument; there is no positional argument marshaling.
pub type OperationFn =
    Arc<dyn Fn(HttpRequest) -> BoxFuture<Result<HttpResponse, Error>> + Send + Sync>;

/// A named operation exposed by a controller. Names starting with an
/// uppercase letter are public and compiled into routes.
#[derive(Clone)]
pub struct Operation {
    pub name: &'static str,
    pub handler: OperationFn,
}

impl Operation {
    pub fn new<F, Fut>(name: &'static str, handler: F) -> Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        Self {
            name,
            handler: Arc::new(move |request| Box::pin(handler(request))),
        }
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation").field("name", &self.name).finish()
    }
}

/// HTTP verbs the route compiler can infer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpVerb::Get),
            "POST" => Some(HttpVerb::Post),
            "PUT" => Some(HttpVerb::Put),
            "DELETE" => Some(HttpVerb::Delete),
            _ => None,
        }
    }
}

impl std::fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A controller: the framework walks its operations at boot and synthesizes
/// routes from their names.
pub trait Controller: Send + Sync + 'static {
    fn operations(&self) -> Vec<Operation>;
}

/// Column type descriptors handed to the data mapper at migration time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    BigInt,
    Text,
    Bool,
    Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind }
    }
}

/// A model: bound to a store table and enumerated at boot for migration.
pub trait Model: Send + Sync + 'static {
    /// Base table name, without prefix or namespace qualification.
    fn table(&self) -> &'static str;

    fn schema(&self) -> Vec<Column>;
}

/// A service: named operations invocable by other plugins.
pub trait Service: Send + Sync + 'static {
    fn operations(&self) -> Vec<&'static str>;

    fn call(
        &self,
        operation: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_round_trip() {
        for verb in [HttpVerb::Get, HttpVerb::Post, HttpVerb::Put, HttpVerb::Delete] {
            assert_eq!(HttpVerb::parse(verb.as_str()), Some(verb));
        }
        assert_eq!(HttpVerb::parse("patch"), None);
        assert_eq!(HttpVerb::parse("get"), Some(HttpVerb::Get));
    }

    #[tokio::test]
    async fn test_operation_invokes_handler() {
        let operation = Operation::new("GetProfile", |_request| async {
            Ok(HttpResponse::ok())
        });

        assert_eq!(operation.name, "GetProfile");
        let response = (operation.handler)(HttpRequest::new("GET", "/x")).await.unwrap();
        assert_eq!(response.status, 200);
    }
}
