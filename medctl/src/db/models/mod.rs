//! Stored document bodies and their typed records.
//!
//! Each module defines the JSON body a collection stores, plus the create and
//! update requests its repository accepts. Bodies are serialized with the same
//! camelCase field names the API uses, so grouped counts and field lookups work
//! directly on the stored JSON.
//!
//! # Conversion to API Models
//!
//! Typed records convert into API responses with `From`:
//!
//! ```ignore
//! use medctl::db::models::doctors::DoctorDBResponse;
//! use medctl::api::models::doctors::DoctorResponse;
//!
//! let record: DoctorDBResponse = /* ... */;
//! let response: DoctorResponse = record.into();
//! ```

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::db::errors::DbError;
use crate::db::store::Document;

pub mod appointments;
pub mod articles;
pub mod doctors;
pub mod inventory;
pub mod tickets;
pub mod users;

/// A typed document body together with its store metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Record<T> {
    pub id: Uuid,
    pub data: T,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<T: DeserializeOwned> TryFrom<Document> for Record<T> {
    type Error = DbError;

    fn try_from(document: Document) -> Result<Self, Self::Error> {
        Ok(Self {
            id: document.id,
            data: serde_json::from_value(document.body)?,
            created_at: document.created_at,
            updated_at: document.updated_at,
        })
    }
}

impl<T: DeserializeOwned> Record<T> {
    /// Decode a batch of documents, failing on the first malformed body
    pub fn from_documents(documents: Vec<Document>) -> Result<Vec<Self>, DbError> {
        documents.into_iter().map(Self::try_from).collect()
    }
}
