// Multi-tenancy for Chassis
//
// The tenant gate extracts a tenant identifier from eligible API requests
// and attaches a tenant-scoped data-store handle to the request context;
// the scoped handle stamps the tenant id on create and filters by it on
// every read, update, and delete.

pub mod error;
pub mod gate;
pub mod scoped;

pub use error::TenantError;
pub use gate::{TenantGate, TenantId};
pub use scoped::{ScopedStore, TENANT_COLUMN};
