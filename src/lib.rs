// Chassis - a convention-driven plugin framework for Rust
//
// Drop in controllers, models, services, and middlewares; the framework
// compiles routes from naming conventions and threads every request through
// an authentication and multi-tenancy pipeline before dispatch.

// Re-export core functionality
pub use chassis_core::*;

// Logging bootstrap
pub use chassis_log;

// Re-export optional crates
#[cfg(feature = "config")]
pub use chassis_config;

#[cfg(feature = "jwt")]
pub use chassis_jwt;

#[cfg(feature = "tenancy")]
pub use chassis_tenancy;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        AfterHook, Application, ApplicationBuilder, BeforeHook, Controller, DataStore, Document,
        Error, Filter, Gate, GateDecision, HttpRequest, HttpResponse, HttpVerb, Kind, MemoryStore,
        Middleware, Model, Operation, Registry, Reply, Service,
    };
}
