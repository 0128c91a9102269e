//! Request pipeline stages.
//!
//! Gates are the mandatory pipeline stages (auth verification, tenant
//! propagation) that run between the optional before-hooks and dispatch, in
//! the order they were installed. A gate either lets the request continue,
//! answers it directly (aborting the pipeline), or fails.
//!
//! [`ApiGroup`] is the route-group boundary: before-hooks run ahead of the
//! gates and after-hooks behind the bound operation, but only for requests
//! under the group's path prefix. The boundary is what enforces hook
//! ordering relative to the gates; there is no priority field.

use crate::hooks::{AfterHook, BeforeHook};
use crate::registry::Registry;
use crate::{Error, HttpRequest, HttpResponse, hooks};
use async_trait::async_trait;
use std::sync::Arc;

/// Outcome of a gate.
pub enum GateDecision {
    /// Pass the request to the next stage.
    Continue,
    /// Answer immediately; no further middleware or route code runs.
    Respond(HttpResponse),
}

/// A mandatory pipeline stage.
#[async_trait]
pub trait Gate: Send + Sync + 'static {
    async fn apply(&self, request: &mut HttpRequest) -> Result<GateDecision, Error>;
}

/// The API route group: hook stages scoped to a path prefix.
pub struct ApiGroup {
    prefix: String,
    before: Vec<(String, Arc<dyn BeforeHook>)>,
    after: Vec<(String, Arc<dyn AfterHook>)>,
}

impl ApiGroup {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    /// Install every probed middleware capability from the registry.
    pub fn install(&mut self, registry: &Registry) {
        for entry in registry.middlewares() {
            if let Some(hook) = entry.hooks.before() {
                self.before.push((entry.identifier.clone(), hook));
            }
            if let Some(hook) = entry.hooks.after() {
                self.after.push((entry.identifier.clone(), hook));
            }
        }
    }

    pub fn applies_to(&self, path: &str) -> bool {
        match path.strip_prefix(&self.prefix) {
            // "/apifoo" is outside the "/api" group; "/api" and "/api/..."
            // are inside.
            Some(rest) => rest.is_empty() || rest.starts_with('/') || self.prefix == "/",
            None => false,
        }
    }

    pub fn has_after_hooks(&self) -> bool {
        !self.after.is_empty()
    }

    pub fn run_before(&self, request: &mut HttpRequest) {
        for (identifier, hook) in &self.before {
            hooks::run_before(identifier, hook.as_ref(), request);
        }
    }

    pub fn run_after(&self, request: &mut HttpRequest) {
        for (identifier, hook) in &self.after {
            hooks::run_after(identifier, hook.as_ref(), request);
        }
    }
}
