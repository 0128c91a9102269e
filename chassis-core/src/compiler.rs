//! Convention route compiler.
//!
//! Walks every registered controller's public operations and turns them into
//! the route table: `{prefix}/{namespace}/{module}/{operation-segments}`
//! with the verb inferred from the operation-name prefix. Runs once at boot,
//! before the server accepts connections; the emitted table is frozen.

use crate::naming::{infer_verb, module_segment, operation_path};
use crate::registry::Registry;
use crate::routing::{Route, RouteTable};
use tracing::debug;

/// Compile the route table from the registry.
///
/// Operation names not starting with an uppercase letter are private and
/// skipped: capability detection is by name, not by declared interface.
/// Duplicate compiled paths are rejected by the table (first wins).
pub fn compile(registry: &Registry, prefix: &str) -> RouteTable {
    let prefix = normalize_prefix(prefix);
    let mut table = RouteTable::new();

    for entry in registry.controllers() {
        let module = module_segment(&entry.identifier);

        for operation in entry.instance.operations() {
            if !is_public(operation.name) {
                continue;
            }

            let verb = infer_verb(operation.name);
            let path = compose_path(&prefix, &entry.namespace, &module, operation.name);

            debug!(verb = %verb, path = %path, controller = %entry.identifier, "route compiled");
            table.push(Route {
                verb,
                path,
                handler: operation.handler,
            });
        }
    }

    table
}

fn is_public(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

fn compose_path(prefix: &str, namespace: &str, module: &str, operation: &str) -> String {
    let mut path = String::from(prefix);
    if !namespace.is_empty() {
        path.push('/');
        path.push_str(namespace);
    }
    // module_segment yields "/" for Index controllers and "/{name}/" otherwise
    path.push_str(module);
    path.push_str(&operation_path(operation));
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{Controller, Operation};
    use crate::{HttpResponse, HttpVerb};

    struct UserController;

    impl Controller for UserController {
        fn operations(&self) -> Vec<Operation> {
            vec![
                Operation::new("GetProfile", |_req| async { Ok(HttpResponse::ok()) }),
                Operation::new("Save", |_req| async { Ok(HttpResponse::ok()) }),
                Operation::new("DelAccount", |_req| async { Ok(HttpResponse::ok()) }),
                Operation::new("internal", |_req| async { Ok(HttpResponse::ok()) }),
            ]
        }
    }

    struct IndexController;

    impl Controller for IndexController {
        fn operations(&self) -> Vec<Operation> {
            vec![Operation::new("Index", |_req| async { Ok(HttpResponse::ok()) })]
        }
    }

    // Index controllers compile at the namespace root, so an operation named
    // UserList lands on /api/shop/user/list, the same path UserController's
    // List operation produces.
    struct Index;

    impl Controller for Index {
        fn operations(&self) -> Vec<Operation> {
            vec![Operation::new("UserList", |_req| async {
                Ok(HttpResponse::ok().with_body(b"via-index".to_vec()))
            })]
        }
    }

    mod colliding {
        use super::*;

        pub struct UserController;

        impl Controller for UserController {
            fn operations(&self) -> Vec<Operation> {
                vec![Operation::new("List", |_req| async { Ok(HttpResponse::ok()) })]
            }
        }
    }

    fn registry_with_user() -> Registry {
        let mut registry = Registry::new();
        assert!(registry.register_controller("shop", UserController));
        registry
    }

    #[test]
    fn test_compiled_paths_and_verbs() {
        let table = compile(&registry_with_user(), "/api");

        let profile = table.find("GET", "/api/shop/user/get/profile").unwrap();
        assert_eq!(profile.verb, HttpVerb::Get);

        assert!(table.find("POST", "/api/shop/user/save").is_some());
        assert!(table.find("DELETE", "/api/shop/user/del/account").is_some());
    }

    #[test]
    fn test_private_operations_skipped() {
        let table = compile(&registry_with_user(), "/api");
        assert_eq!(table.len(), 3);
        assert!(table.find("POST", "/api/shop/user/internal").is_none());
    }

    #[test]
    fn test_index_controller_maps_to_root_segment() {
        let mut registry = Registry::new();
        registry.register_controller("shop", IndexController);

        let table = compile(&registry, "/api");
        assert!(table.find("GET", "/api/shop/index").is_some());
    }

    #[test]
    fn test_prefix_normalization() {
        let table = compile(&registry_with_user(), "api/");
        assert!(table.find("GET", "/api/shop/user/get/profile").is_some());
    }

    #[test]
    fn test_colliding_paths_first_wins() {
        let mut registry = Registry::new();
        assert!(registry.register_controller("shop", Index));
        assert!(registry.register_controller("shop", colliding::UserController));

        // Both compile POST /api/shop/user/list; the first registration wins
        // and the duplicate is skipped.
        let table = compile(&registry, "/api");
        assert_eq!(table.len(), 1);
        assert!(table.find("POST", "/api/shop/user/list").is_some());
    }
}
