//! Data-store handle.
//!
//! The relational mapper is an external collaborator consumed through the
//! opaque [`DataStore`] trait: bind a model to a table at migration time,
//! then run document CRUD against it. The framework never inspects the
//! backend; tenancy wraps any implementation with its scoping hooks.
//!
//! [`MemoryStore`] is the in-process reference backend used by tests and
//! demos. Store calls are async and abort with the request task, so a
//! dropped connection cancels in-flight work; there is no retry logic.

use crate::naming::snake_case_column;
use crate::traits::{Column, Model};
use crate::Error;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;

/// A stored row: column name to JSON value.
pub type Document = serde_json::Map<String, Value>;

/// Conjunctive equality filter over document columns.
///
/// Field names are normalized to their column form, so filters may be built
/// from either `BusinessID` or `business_id`.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.clauses.push((snake_case_column(name), value.into()));
        self
    }

    pub fn clauses(&self) -> &[(String, Value)] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.clauses
            .iter()
            .all(|(column, value)| doc.get(column) == Some(value))
    }
}

/// The opaque relational-mapper handle.
#[async_trait]
pub trait DataStore: Send + Sync + 'static {
    /// Bind a model to a table, creating or updating its shape.
    async fn migrate(&self, table: &str, model: &dyn Model) -> Result<(), Error>;

    /// Insert a document, returning it with any store-assigned columns.
    async fn insert(&self, table: &str, doc: Document) -> Result<Document, Error>;

    async fn find(&self, table: &str, filter: &Filter) -> Result<Vec<Document>, Error>;

    /// Merge `changes` into every matching document; returns the match count.
    async fn update(&self, table: &str, filter: &Filter, changes: Document) -> Result<u64, Error>;

    /// Delete matching documents; returns the removed count.
    async fn delete(&self, table: &str, filter: &Filter) -> Result<u64, Error>;
}

struct Table {
    columns: Vec<Column>,
    rows: Vec<Document>,
    next_id: i64,
}

/// In-memory reference implementation of [`DataStore`].
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns recorded for a table, if it has been migrated.
    pub fn columns(&self, table: &str) -> Option<Vec<Column>> {
        self.tables.lock().get(table).map(|t| t.columns.clone())
    }

    fn with_table<T>(
        &self,
        table: &str,
        f: impl FnOnce(&mut Table) -> T,
    ) -> Result<T, Error> {
        let mut tables = self.tables.lock();
        let entry = tables
            .get_mut(table)
            .ok_or_else(|| Error::Store(format!("unknown table {table}")))?;
        Ok(f(entry))
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn migrate(&self, table: &str, model: &dyn Model) -> Result<(), Error> {
        let mut tables = self.tables.lock();
        match tables.get_mut(table) {
            Some(existing) => existing.columns = model.schema(),
            None => {
                tables.insert(
                    table.to_string(),
                    Table {
                        columns: model.schema(),
                        rows: Vec::new(),
                        next_id: 1,
                    },
                );
            }
        }
        Ok(())
    }

    async fn insert(&self, table: &str, mut doc: Document) -> Result<Document, Error> {
        self.with_table(table, |entry| {
            if !doc.contains_key("id") {
                doc.insert("id".to_string(), Value::from(entry.next_id));
                entry.next_id += 1;
            }
            entry.rows.push(doc.clone());
            doc
        })
    }

    async fn find(&self, table: &str, filter: &Filter) -> Result<Vec<Document>, Error> {
        self.with_table(table, |entry| {
            entry
                .rows
                .iter()
                .filter(|row| filter.matches(row))
                .cloned()
                .collect()
        })
    }

    async fn update(&self, table: &str, filter: &Filter, changes: Document) -> Result<u64, Error> {
        self.with_table(table, |entry| {
            let mut count = 0;
            for row in entry.rows.iter_mut().filter(|row| filter.matches(row)) {
                for (column, value) in &changes {
                    row.insert(column.clone(), value.clone());
                }
                count += 1;
            }
            count
        })
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<u64, Error> {
        self.with_table(table, |entry| {
            let before = entry.rows.len();
            entry.rows.retain(|row| !filter.matches(row));
            (before - entry.rows.len()) as u64
        })
    }
}
