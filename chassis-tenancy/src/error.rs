// Tenant resolution errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TenantError {
    #[error("tenant_id missing: pass it via the tenant_id header or query parameter")]
    Missing,

    #[error("tenant id absent from request context")]
    AbsentFromContext,
}
