//! In-process document store backed by a [`DashMap`].
//!
//! Nothing is persisted; used for local development (`database.type: memory`)
//! and by the test suite.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use super::{Collection, Document, DocumentStore, field_text};
use crate::db::errors::{DbError, Result};

#[derive(Debug, Clone)]
struct Entry {
    seq: u64,
    document: Document,
}

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    entries: DashMap<(Collection, Uuid), Entry>,
    next_seq: AtomicU64,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a collection in insertion order
    fn ordered(&self, collection: Collection) -> Vec<Document> {
        let mut entries: Vec<Entry> = self
            .entries
            .iter()
            .filter(|entry| entry.key().0 == collection)
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by_key(|entry| entry.seq);
        entries.into_iter().map(|entry| entry.document).collect()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: Collection, body: Value) -> Result<Document> {
        let now = Utc::now();
        let document = Document {
            id: Uuid::new_v4(),
            body,
            created_at: now,
            updated_at: now,
        };
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            (collection, document.id),
            Entry {
                seq,
                document: document.clone(),
            },
        );
        Ok(document)
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>> {
        Ok(self.ordered(collection))
    }

    async fn find_by_id(&self, collection: Collection, id: Uuid) -> Result<Option<Document>> {
        Ok(self.entries.get(&(collection, id)).map(|entry| entry.document.clone()))
    }

    async fn find_by_ids(&self, collection: Collection, ids: &[Uuid]) -> Result<Vec<Document>> {
        Ok(self
            .ordered(collection)
            .into_iter()
            .filter(|document| ids.contains(&document.id))
            .collect())
    }

    async fn find_one_by_field(&self, collection: Collection, field: &str, value: &str) -> Result<Option<Document>> {
        Ok(self
            .ordered(collection)
            .into_iter()
            .find(|document| field_text(&document.body, field).as_deref() == Some(value)))
    }

    async fn count_by_field(&self, collection: Collection, field: &str, value: &str) -> Result<i64> {
        let count = self
            .entries
            .iter()
            .filter(|entry| entry.key().0 == collection)
            .filter(|entry| field_text(&entry.document.body, field).as_deref() == Some(value))
            .count();
        Ok(count as i64)
    }

    async fn group_count(&self, collection: Collection, field: &str) -> Result<Vec<(String, i64)>> {
        let mut groups: BTreeMap<String, i64> = BTreeMap::new();
        for entry in self.entries.iter().filter(|entry| entry.key().0 == collection) {
            if let Some(value) = field_text(&entry.document.body, field) {
                *groups.entry(value).or_default() += 1;
            }
        }
        Ok(groups.into_iter().collect())
    }

    async fn replace(&self, collection: Collection, id: Uuid, body: Value) -> Result<Document> {
        let mut entry = self.entries.get_mut(&(collection, id)).ok_or(DbError::NotFound)?;
        if entry.document.body == body {
            return Err(DbError::Unchanged);
        }
        entry.document.body = body;
        entry.document.updated_at = Utc::now();
        Ok(entry.document.clone())
    }

    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool> {
        Ok(self.entries.remove(&(collection, id)).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_find_all_keeps_insertion_order_per_collection() {
        let store = MemoryDocumentStore::new();
        for name in ["a", "b", "c"] {
            store.insert(Collection::Doctors, json!({"doctorName": name})).await.unwrap();
        }
        store.insert(Collection::Articles, json!({"title": "x"})).await.unwrap();

        let names: Vec<_> = store
            .find_all(Collection::Doctors)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.body["doctorName"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_replace_outcomes() {
        let store = MemoryDocumentStore::new();
        let doc = store.insert(Collection::Tickets, json!({"status": "Open"})).await.unwrap();

        assert!(matches!(
            store.replace(Collection::Tickets, doc.id, json!({"status": "Open"})).await,
            Err(DbError::Unchanged)
        ));
        assert!(matches!(
            store.replace(Collection::Tickets, Uuid::new_v4(), json!({"status": "Open"})).await,
            Err(DbError::NotFound)
        ));

        let updated = store
            .replace(Collection::Tickets, doc.id, json!({"status": "Closed"}))
            .await
            .unwrap();
        assert_eq!(updated.body["status"], "Closed");
        assert_eq!(updated.created_at, doc.created_at);
        assert!(updated.updated_at >= doc.updated_at);
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let store = MemoryDocumentStore::new();
        let doc = store.insert(Collection::Appointments, json!({})).await.unwrap();
        assert!(store.delete(Collection::Appointments, doc.id).await.unwrap());
        assert!(!store.delete(Collection::Appointments, doc.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_field_queries() {
        let store = MemoryDocumentStore::new();
        let doctor = Uuid::new_v4().to_string();
        store.insert(Collection::Appointments, json!({"doctor": doctor})).await.unwrap();
        store.insert(Collection::Appointments, json!({"doctor": doctor})).await.unwrap();
        store.insert(Collection::Appointments, json!({"doctor": "other"})).await.unwrap();

        assert_eq!(store.count_by_field(Collection::Appointments, "doctor", &doctor).await.unwrap(), 2);
        assert!(
            store
                .find_one_by_field(Collection::Appointments, "doctor", "nobody")
                .await
                .unwrap()
                .is_none()
        );

        let groups = store.group_count(Collection::Appointments, "doctor").await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups.iter().map(|(_, c)| c).sum::<i64>(), 3);
    }
}
