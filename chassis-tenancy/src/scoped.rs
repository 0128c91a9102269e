// Tenant-scoped data-store handle

use crate::TenantError;
use async_trait::async_trait;
use chassis_core::{DataStore, Document, Error, Filter, Model};
use serde_json::Value;
use std::sync::Arc;

/// Column carrying the tenant identifier on tenant-scoped tables.
pub const TENANT_COLUMN: &str = "tenant_id";

/// A [`DataStore`] wrapper bound to one tenant.
///
/// Create stamps the tenant id onto the document; read, update, and delete
/// add a tenant filter clause. An empty tenant id at call time is a hard
/// failure, never a silent cross-tenant query.
#[derive(Clone)]
pub struct ScopedStore {
    inner: Arc<dyn DataStore>,
    tenant_id: String,
}

impl ScopedStore {
    pub fn new(inner: Arc<dyn DataStore>, tenant_id: impl Into<String>) -> Self {
        Self {
            inner,
            tenant_id: tenant_id.into(),
        }
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    fn require_tenant(&self) -> Result<&str, Error> {
        if self.tenant_id.is_empty() {
            return Err(Error::Store(TenantError::AbsentFromContext.to_string()));
        }
        Ok(&self.tenant_id)
    }

    fn scoped_filter(&self, filter: &Filter) -> Result<Filter, Error> {
        let tenant_id = self.require_tenant()?;
        Ok(filter.clone().field(TENANT_COLUMN, tenant_id))
    }
}

#[async_trait]
impl DataStore for ScopedStore {
    async fn migrate(&self, table: &str, model: &dyn Model) -> Result<(), Error> {
        self.inner.migrate(table, model).await
    }

    async fn insert(&self, table: &str, mut doc: Document) -> Result<Document, Error> {
        let tenant_id = self.require_tenant()?;
        doc.insert(TENANT_COLUMN.to_string(), Value::from(tenant_id));
        self.inner.insert(table, doc).await
    }

    async fn find(&self, table: &str, filter: &Filter) -> Result<Vec<Document>, Error> {
        self.inner.find(table, &self.scoped_filter(filter)?).await
    }

    async fn update(&self, table: &str, filter: &Filter, changes: Document) -> Result<u64, Error> {
        self.inner
            .update(table, &self.scoped_filter(filter)?, changes)
            .await
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<u64, Error> {
        self.inner.delete(table, &self.scoped_filter(filter)?).await
    }
}
