// Route table and request dispatch

use crate::{Error, HttpRequest, HttpResponse, HttpVerb, OperationFn};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// A compiled route. Immutable once the table is built.
#[derive(Clone)]
pub struct Route {
    pub verb: HttpVerb,
    pub path: String,
    pub handler: OperationFn,
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("verb", &self.verb)
            .field("path", &self.path)
            .finish()
    }
}

/// The boot-compiled route table. Append-only during compilation, read-only
/// while serving; the server receives it by ownership transfer, so no lock
/// guards reads.
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route. A duplicate `(verb, path)` pair is rejected so
    /// dispatch never depends on insertion order: the first entry wins and
    /// the duplicate is logged and skipped.
    pub fn push(&mut self, route: Route) -> bool {
        if self
            .routes
            .iter()
            .any(|existing| existing.verb == route.verb && existing.path == route.path)
        {
            warn!(verb = %route.verb, path = %route.path, "duplicate route skipped");
            return false;
        }
        self.routes.push(route);
        true
    }

    /// Linear scan in insertion order; first match wins.
    pub fn find(&self, method: &str, path: &str) -> Option<&Route> {
        self.routes
            .iter()
            .find(|route| route.verb.as_str() == method && route.path == path)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Dispatcher over a frozen route table.
#[derive(Clone)]
pub struct Router {
    table: Arc<RouteTable>,
}

impl Router {
    pub fn new(table: RouteTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Dispatch a request to its bound operation.
    ///
    /// Query parameters still embedded in the path are split off first so
    /// requests built directly in tests behave like ones parsed off the
    /// wire. An unmatched request is a `RouteNotFound` error, never a
    /// silently dropped connection.
    pub async fn dispatch(&self, mut request: HttpRequest) -> Result<HttpResponse, Error> {
        if let Some((path, query)) = request.path.split_once('?') {
            let path = path.to_string();
            request.query_params.extend(parse_query_string(query));
            request.path = path;
        }

        let route = self
            .table
            .find(&request.method, &request.path)
            .ok_or_else(|| Error::RouteNotFound(format!("{} {}", request.method, request.path)))?;
        let handler = route.handler.clone();
        handler(request).await
    }
}

/// Parse a query string into a parameter map.
pub fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let mut split = part.splitn(2, '=');
            let key = split.next()?;
            let value = split.next().unwrap_or("");
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Operation;

    fn route(verb: HttpVerb, path: &str, marker: &'static str) -> Route {
        let operation = Operation::new(marker, move |_req| async move {
            Ok(HttpResponse::ok().with_body(marker.as_bytes().to_vec()))
        });
        Route {
            verb,
            path: path.to_string(),
            handler: operation.handler,
        }
    }

    #[test]
    fn test_push_and_find() {
        let mut table = RouteTable::new();
        assert!(table.push(route(HttpVerb::Get, "/api/shop/user/get/profile", "A")));
        assert!(table.push(route(HttpVerb::Post, "/api/shop/user/save", "B")));

        assert!(table.find("GET", "/api/shop/user/get/profile").is_some());
        assert!(table.find("POST", "/api/shop/user/get/profile").is_none());
        assert!(table.find("GET", "/api/shop/user/save").is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_duplicate_route_rejected_first_wins() {
        let mut table = RouteTable::new();
        assert!(table.push(route(HttpVerb::Get, "/api/shop/user/list", "first")));
        assert!(!table.push(route(HttpVerb::Get, "/api/shop/user/list", "second")));
        assert_eq!(table.len(), 1);

        // Same path under a different verb is a distinct route.
        assert!(table.push(route(HttpVerb::Post, "/api/shop/user/list", "third")));
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_runs_bound_operation() {
        let mut table = RouteTable::new();
        table.push(route(HttpVerb::Get, "/api/shop/user/get/profile", "profile"));
        let router = Router::new(table);

        let response = router
            .dispatch(HttpRequest::new("GET", "/api/shop/user/get/profile"))
            .await
            .unwrap();
        assert_eq!(response.body, b"profile");
    }

    #[tokio::test]
    async fn test_dispatch_unmatched_is_not_found() {
        let router = Router::new(RouteTable::new());
        let err = router
            .dispatch(HttpRequest::new("GET", "/api/shop/missing"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_dispatch_splits_query_string() {
        let mut table = RouteTable::new();
        table.push(route(HttpVerb::Get, "/api/shop/user/list", "list"));
        let router = Router::new(table);

        let response = router
            .dispatch(HttpRequest::new("GET", "/api/shop/user/list?page=2&size=10"))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
    }

    #[test]
    fn test_parse_query_string() {
        let params = parse_query_string("tenant_id=t1&page=2");
        assert_eq!(params.get("tenant_id").map(String::as_str), Some("t1"));
        assert_eq!(params.get("page").map(String::as_str), Some("2"));

        let params = parse_query_string("flag&debug=true");
        assert_eq!(params.get("flag").map(String::as_str), Some(""));
        assert_eq!(params.get("debug").map(String::as_str), Some("true"));

        assert!(parse_query_string("").is_empty());
    }
}
