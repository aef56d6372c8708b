//! Document storage backends.
//!
//! Every record lives in a named [`Collection`] as a JSON body plus a generated
//! id and timestamps. The typed repositories in [`crate::db::handlers`] own the
//! body shapes; the store only knows about JSON.
//!
//! Two backends implement [`DocumentStore`]:
//!
//! - [`PgDocumentStore`]: a single `documents` table in PostgreSQL
//! - [`MemoryDocumentStore`]: a process-local map for development and tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::db::errors::Result;

pub mod memory;
pub mod postgres;

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Named document collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Doctors,
    Appointments,
    Articles,
    Tickets,
    InventoryItems,
    Users,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Doctors => "doctors",
            Collection::Appointments => "appointments",
            Collection::Articles => "articles",
            Collection::Tickets => "tickets",
            Collection::InventoryItems => "inventory_items",
            Collection::Users => "users",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored document with its store-managed metadata
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Document {
    pub id: Uuid,
    pub body: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Storage operations over JSON document collections.
///
/// Field lookups compare against the textual value of a top-level body field, the
/// way PostgreSQL's `->>` operator renders it. Documents are returned in insertion
/// order.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Insert a new document, generating its id and timestamps
    async fn insert(&self, collection: Collection, body: Value) -> Result<Document>;

    /// All documents of a collection
    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>>;

    async fn find_by_id(&self, collection: Collection, id: Uuid) -> Result<Option<Document>>;

    async fn find_by_ids(&self, collection: Collection, ids: &[Uuid]) -> Result<Vec<Document>>;

    /// First document whose top-level `field` renders as `value`
    async fn find_one_by_field(&self, collection: Collection, field: &str, value: &str) -> Result<Option<Document>>;

    /// Number of documents whose top-level `field` renders as `value`
    async fn count_by_field(&self, collection: Collection, field: &str, value: &str) -> Result<i64>;

    /// Count documents per distinct value of `field`, ordered by value. Documents
    /// without the field are skipped.
    async fn group_count(&self, collection: Collection, field: &str) -> Result<Vec<(String, i64)>>;

    /// Replace a document body.
    ///
    /// Fails with [`DbError::NotFound`](crate::db::errors::DbError::NotFound) when the
    /// document does not exist and with
    /// [`DbError::Unchanged`](crate::db::errors::DbError::Unchanged) when `body` equals
    /// the stored body.
    async fn replace(&self, collection: Collection, id: Uuid, body: Value) -> Result<Document>;

    /// Remove a document, returning whether it existed
    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool>;
}

/// Render a top-level body field as text, matching `->>` semantics
pub(crate) fn field_text(body: &Value, field: &str) -> Option<String> {
    match body.get(field)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
