//! Plugin registry.
//!
//! An explicit builder populated during boot and consumed by the
//! application: controllers, models, services, and middlewares each live in
//! their own table keyed by the cleaned type identifier. Registration happens
//! single-threaded before the server starts; afterwards the registry is
//! frozen inside the application and reads need no synchronization.
//!
//! Registration returns `false` instead of erroring: a rejected plugin is
//! logged and boot continues without it.

use crate::hooks::{self, HookSet, Middleware};
use crate::naming::clean_type_name;
use crate::traits::{Controller, Model, Service};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// The four plugin kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Controller,
    Model,
    Service,
    Middleware,
}

/// A registered controller with its namespace grouping.
#[derive(Clone)]
pub struct ControllerEntry {
    pub identifier: String,
    pub namespace: String,
    pub instance: Arc<dyn Controller>,
}

/// A registered middleware with its probed capabilities.
#[derive(Clone)]
pub struct MiddlewareEntry {
    pub identifier: String,
    pub hooks: HookSet,
}

#[derive(Default)]
pub struct Registry {
    controllers: Vec<ControllerEntry>,
    models: HashMap<String, Arc<dyn Model>>,
    /// Namespace -> ordered model list, consumed only by schema migration.
    module_pool: HashMap<String, Vec<Arc<dyn Model>>>,
    services: HashMap<String, Arc<dyn Service>>,
    middlewares: Vec<MiddlewareEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller under an application namespace.
    ///
    /// Rejected when the instance exposes no public operations, or when the
    /// identifier is already taken within the namespace. Unlike the other
    /// kinds, controllers never overwrite.
    pub fn register_controller<C: Controller>(&mut self, namespace: &str, instance: C) -> bool {
        let identifier = clean_type_name(std::any::type_name::<C>()).to_string();

        if instance.operations().is_empty() {
            warn!(kind = "controller", identifier = %identifier, "rejected: no public operations");
            return false;
        }
        if self
            .controllers
            .iter()
            .any(|entry| entry.namespace == namespace && entry.identifier == identifier)
        {
            warn!(
                kind = "controller",
                identifier = %identifier,
                namespace,
                "rejected: identifier already registered"
            );
            return false;
        }

        self.controllers.push(ControllerEntry {
            identifier,
            namespace: namespace.to_string(),
            instance: Arc::new(instance),
        });
        true
    }

    /// Register a model. With a namespace the model joins that namespace's
    /// pool and is migrated under the namespace-qualified table; without one
    /// it is a global model. Re-registration of a global model under an
    /// existing identifier overwrites.
    pub fn register_model<M: Model>(&mut self, namespace: Option<&str>, instance: M) -> bool {
        let identifier = clean_type_name(std::any::type_name::<M>()).to_string();

        if instance.table().is_empty() {
            warn!(kind = "model", identifier = %identifier, "rejected: empty table name");
            return false;
        }

        let instance: Arc<dyn Model> = Arc::new(instance);
        match namespace {
            Some(namespace) => {
                self.module_pool
                    .entry(namespace.to_string())
                    .or_default()
                    .push(instance);
            }
            None => {
                self.models.insert(identifier, instance);
            }
        }
        true
    }

    /// Register a service. Re-registration overwrites.
    pub fn register_service<S: Service>(&mut self, instance: S) -> bool {
        let identifier = clean_type_name(std::any::type_name::<S>()).to_string();

        if instance.operations().is_empty() {
            warn!(kind = "service", identifier = %identifier, "rejected: no public operations");
            return false;
        }

        self.services.insert(identifier, Arc::new(instance));
        true
    }

    /// Register a middleware. The hook probe runs once here; an instance
    /// providing neither hook is rejected. Re-registration overwrites in
    /// place, keeping the original position in the install order.
    pub fn register_middleware<M: Middleware>(&mut self, instance: M) -> bool {
        let identifier = clean_type_name(std::any::type_name::<M>()).to_string();
        let hooks = hooks::probe(instance);

        if hooks.is_none() {
            warn!(kind = "middleware", identifier = %identifier, "rejected: no hook capability");
            return false;
        }

        if let Some(entry) = self
            .middlewares
            .iter_mut()
            .find(|entry| entry.identifier == identifier)
        {
            entry.hooks = hooks;
        } else {
            self.middlewares.push(MiddlewareEntry { identifier, hooks });
        }
        true
    }

    pub fn controller(&self, namespace: &str, identifier: &str) -> Option<Arc<dyn Controller>> {
        self.controllers
            .iter()
            .find(|entry| entry.namespace == namespace && entry.identifier == identifier)
            .map(|entry| entry.instance.clone())
    }

    pub fn controllers(&self) -> &[ControllerEntry] {
        &self.controllers
    }

    pub fn model(&self, identifier: &str) -> Option<Arc<dyn Model>> {
        self.models.get(identifier).cloned()
    }

    pub fn models(&self) -> impl Iterator<Item = (&str, &Arc<dyn Model>)> {
        self.models.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The per-namespace model pool, used only for migration enumeration.
    pub fn module_pool(&self) -> &HashMap<String, Vec<Arc<dyn Model>>> {
        &self.module_pool
    }

    pub fn service(&self, identifier: &str) -> Option<Arc<dyn Service>> {
        self.services.get(identifier).cloned()
    }

    pub fn middlewares(&self) -> &[MiddlewareEntry] {
        &self.middlewares
    }

    pub fn count(&self, kind: Kind) -> usize {
        match kind {
            Kind::Controller => self.controllers.len(),
            Kind::Model => {
                self.models.len() + self.module_pool.values().map(Vec::len).sum::<usize>()
            }
            Kind::Service => self.services.len(),
            Kind::Middleware => self.middlewares.len(),
        }
    }
}
