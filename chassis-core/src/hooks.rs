//! Optional middleware capabilities.
//!
//! A middleware may provide a before-request hook, an after-request hook,
//! both, or neither. The two capabilities are narrow single-method traits;
//! the registry probes for them exactly once at registration and caches the
//! result as a [`HookSet`], so no per-request capability inspection happens.
//!
//! Hook invocation is fault-contained: a panicking hook is logged and
//! swallowed so one misbehaving middleware cannot abort the pipeline.

use crate::HttpRequest;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::warn;

/// Runs ahead of the auth and tenant gates inside the API route group.
pub trait BeforeHook: Send + Sync + 'static {
    fn before_request(&self, ctx: &mut HttpRequest);
}

/// Runs after the bound operation inside the API route group.
pub trait AfterHook: Send + Sync + 'static {
    fn after_request(&self, ctx: &mut HttpRequest);
}

/// Probe result cached on the registry entry.
#[derive(Clone)]
pub enum HookSet {
    None,
    Before(Arc<dyn BeforeHook>),
    After(Arc<dyn AfterHook>),
    Both {
        before: Arc<dyn BeforeHook>,
        after: Arc<dyn AfterHook>,
    },
}

impl HookSet {
    pub fn is_none(&self) -> bool {
        matches!(self, HookSet::None)
    }

    pub fn before(&self) -> Option<Arc<dyn BeforeHook>> {
        match self {
            HookSet::Before(hook) => Some(hook.clone()),
            HookSet::Both { before, .. } => Some(before.clone()),
            _ => None,
        }
    }

    pub fn after(&self) -> Option<Arc<dyn AfterHook>> {
        match self {
            HookSet::After(hook) => Some(hook.clone()),
            HookSet::Both { after, .. } => Some(after.clone()),
            _ => None,
        }
    }
}

impl std::fmt::Debug for HookSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            HookSet::None => "None",
            HookSet::Before(_) => "Before",
            HookSet::After(_) => "After",
            HookSet::Both { .. } => "Both",
        };
        f.write_str(tag)
    }
}

/// Registration surface for middlewares.
///
/// Implementors override the probe for each hook they provide, returning
/// `Some(self)`. Capability resolution happens at the type level in Rust, so
/// the upcast is written out once per middleware instead of discovered by
/// runtime inspection; a missing probe is a silently skipped capability, not
/// an error.
pub trait Middleware: Send + Sync + 'static {
    fn probe_before(self: Arc<Self>) -> Option<Arc<dyn BeforeHook>> {
        None
    }

    fn probe_after(self: Arc<Self>) -> Option<Arc<dyn AfterHook>> {
        None
    }
}

/// Probe a middleware instance once and collapse the result.
pub fn probe<M: Middleware>(instance: M) -> HookSet {
    let instance = Arc::new(instance);
    let before = instance.clone().probe_before();
    let after = instance.probe_after();
    match (before, after) {
        (None, None) => HookSet::None,
        (Some(before), None) => HookSet::Before(before),
        (None, Some(after)) => HookSet::After(after),
        (Some(before), Some(after)) => HookSet::Both { before, after },
    }
}

/// Invoke a before-hook with panic containment.
pub fn run_before(identifier: &str, hook: &dyn BeforeHook, ctx: &mut HttpRequest) {
    if catch_unwind(AssertUnwindSafe(|| hook.before_request(ctx))).is_err() {
        warn!(
            middleware = identifier,
            stage = "before",
            "middleware hook panicked; fault contained"
        );
    }
}

/// Invoke an after-hook with panic containment.
pub fn run_after(identifier: &str, hook: &dyn AfterHook, ctx: &mut HttpRequest) {
    if catch_unwind(AssertUnwindSafe(|| hook.after_request(ctx))).is_err() {
        warn!(
            middleware = identifier,
            stage = "after",
            "middleware hook panicked; fault contained"
        );
    }
}
