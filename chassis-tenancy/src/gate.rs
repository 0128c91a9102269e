// Tenant gate: extracts the tenant id and scopes the data-store handle

use crate::scoped::ScopedStore;
use crate::TenantError;
use async_trait::async_trait;
use chassis_core::{DataStore, Error, Gate, GateDecision, HttpRequest, HttpResponse};
use regex::Regex;
use std::sync::{Arc, OnceLock};

/// Matches version segments like `v1`, `v2`, `v10`.
fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^v\d+$").expect("version pattern compiles"))
}

/// Raw tenant identifier attached to the request extensions.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TenantId(pub String);

/// Pipeline gate propagating tenant context into the request.
///
/// A no-op unless enforcement is enabled. Among enabled requests, two
/// independent bypass conditions apply before the id is required: a path
/// that does not split into exactly five segments is skipped, and a path
/// whose second segment is a version tag is skipped. Both branches are
/// deliberate and mirror the existing contract; either alone exempts the
/// request.
pub struct TenantGate {
    enforce: bool,
    api_prefix: String,
    store: Arc<dyn DataStore>,
}

impl TenantGate {
    pub fn new(enforce: bool, api_prefix: impl Into<String>, store: Arc<dyn DataStore>) -> Self {
        let api_prefix = api_prefix.into().trim_matches('/').to_string();
        Self {
            enforce,
            api_prefix,
            store,
        }
    }

    fn tenant_id(request: &HttpRequest) -> Option<String> {
        request
            .header("tenant_id")
            .cloned()
            .filter(|id| !id.is_empty())
            .or_else(|| {
                request
                    .query("tenant_id")
                    .cloned()
                    .filter(|id| !id.is_empty())
            })
    }
}

#[async_trait]
impl Gate for TenantGate {
    async fn apply(&self, request: &mut HttpRequest) -> Result<GateDecision, Error> {
        if !self.enforce {
            return Ok(GateDecision::Continue);
        }

        let trimmed = request.path.trim_matches('/');
        if !trimmed.starts_with(&format!("{}/", self.api_prefix)) {
            return Ok(GateDecision::Continue);
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        if segments.len() != 5 {
            return Ok(GateDecision::Continue);
        }
        if version_pattern().is_match(segments[1]) {
            return Ok(GateDecision::Continue);
        }

        let Some(tenant_id) = Self::tenant_id(request) else {
            return Ok(GateDecision::Respond(HttpResponse::failure(
                400,
                TenantError::Missing.to_string(),
            )));
        };

        let scoped = ScopedStore::new(self.store.clone(), tenant_id.clone());
        request.extensions.insert(scoped);
        request.extensions.insert(TenantId(tenant_id));
        Ok(GateDecision::Continue)
    }
}
