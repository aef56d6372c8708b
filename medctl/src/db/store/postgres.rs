//! PostgreSQL document store: every collection shares the `documents` table.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use super::{Collection, Document, DocumentStore};
use crate::db::errors::{DbError, Result};

#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    #[instrument(skip(self, body), fields(collection = %collection), err)]
    async fn insert(&self, collection: Collection, body: Value) -> Result<Document> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            RETURNING id, body, created_at, updated_at
            "#,
        )
        .bind(collection.as_str())
        .bind(Uuid::new_v4())
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(document)
    }

    #[instrument(skip(self), fields(collection = %collection), err)]
    async fn find_all(&self, collection: Collection) -> Result<Vec<Document>> {
        let documents = sqlx::query_as::<_, Document>(
            "SELECT id, body, created_at, updated_at FROM documents WHERE collection = $1 ORDER BY seq",
        )
        .bind(collection.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    #[instrument(skip(self), fields(collection = %collection, id = %crate::types::abbrev_uuid(&id)), err)]
    async fn find_by_id(&self, collection: Collection, id: Uuid) -> Result<Option<Document>> {
        let document = sqlx::query_as::<_, Document>(
            "SELECT id, body, created_at, updated_at FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    #[instrument(skip(self, ids), fields(collection = %collection, count = ids.len()), err)]
    async fn find_by_ids(&self, collection: Collection, ids: &[Uuid]) -> Result<Vec<Document>> {
        let documents = sqlx::query_as::<_, Document>(
            "SELECT id, body, created_at, updated_at FROM documents WHERE collection = $1 AND id = ANY($2) ORDER BY seq",
        )
        .bind(collection.as_str())
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    #[instrument(skip(self, value), fields(collection = %collection), err)]
    async fn find_one_by_field(&self, collection: Collection, field: &str, value: &str) -> Result<Option<Document>> {
        let document = sqlx::query_as::<_, Document>(
            r#"
            SELECT id, body, created_at, updated_at FROM documents
            WHERE collection = $1 AND body ->> ($2::text) = $3
            ORDER BY seq
            LIMIT 1
            "#,
        )
        .bind(collection.as_str())
        .bind(field)
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    #[instrument(skip(self, value), fields(collection = %collection), err)]
    async fn count_by_field(&self, collection: Collection, field: &str, value: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM documents WHERE collection = $1 AND body ->> ($2::text) = $3",
        )
        .bind(collection.as_str())
        .bind(field)
        .bind(value)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    #[instrument(skip(self), fields(collection = %collection), err)]
    async fn group_count(&self, collection: Collection, field: &str) -> Result<Vec<(String, i64)>> {
        let groups = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT body ->> ($2::text) AS value, COUNT(*) AS count
            FROM documents
            WHERE collection = $1 AND body ->> ($2::text) IS NOT NULL
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(collection.as_str())
        .bind(field)
        .fetch_all(&self.pool)
        .await?;

        Ok(groups)
    }

    #[instrument(skip(self, body), fields(collection = %collection, id = %crate::types::abbrev_uuid(&id)), err)]
    async fn replace(&self, collection: Collection, id: Uuid, body: Value) -> Result<Document> {
        let updated = sqlx::query_as::<_, Document>(
            r#"
            UPDATE documents SET body = $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2 AND body IS DISTINCT FROM $3
            RETURNING id, body, created_at, updated_at
            "#,
        )
        .bind(collection.as_str())
        .bind(id)
        .bind(body)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(document) = updated {
            return Ok(document);
        }

        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM documents WHERE collection = $1 AND id = $2)")
            .bind(collection.as_str())
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        if exists { Err(DbError::Unchanged) } else { Err(DbError::NotFound) }
    }

    #[instrument(skip(self), fields(collection = %collection, id = %crate::types::abbrev_uuid(&id)), err)]
    async fn delete(&self, collection: Collection, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_insert_and_find(pool: PgPool) {
        let store = PgDocumentStore::new(pool);
        let doc = store
            .insert(Collection::Doctors, json!({"doctorName": "Silva", "specialization": "Cardiology"}))
            .await
            .unwrap();

        let found = store.find_by_id(Collection::Doctors, doc.id).await.unwrap().unwrap();
        assert_eq!(found.body["doctorName"], "Silva");

        // Same id is not visible from another collection
        assert!(store.find_by_id(Collection::Articles, doc.id).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_replace_distinguishes_unchanged_and_missing(pool: PgPool) {
        let store = PgDocumentStore::new(pool);
        let body = json!({"itemName": "Gloves", "quantity": 4});
        let doc = store.insert(Collection::InventoryItems, body.clone()).await.unwrap();

        assert!(matches!(
            store.replace(Collection::InventoryItems, doc.id, body).await,
            Err(DbError::Unchanged)
        ));
        assert!(matches!(
            store.replace(Collection::InventoryItems, Uuid::new_v4(), json!({})).await,
            Err(DbError::NotFound)
        ));

        let updated = store
            .replace(Collection::InventoryItems, doc.id, json!({"itemName": "Gloves", "quantity": 0}))
            .await
            .unwrap();
        assert_eq!(updated.body["quantity"], 0);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_group_count_and_field_lookup(pool: PgPool) {
        let store = PgDocumentStore::new(pool);
        for specialization in ["Cardiology", "Neurology", "Cardiology"] {
            store
                .insert(Collection::Doctors, json!({"specialization": specialization}))
                .await
                .unwrap();
        }

        let groups = store.group_count(Collection::Doctors, "specialization").await.unwrap();
        assert_eq!(groups, vec![("Cardiology".to_string(), 2), ("Neurology".to_string(), 1)]);
        assert_eq!(
            store.count_by_field(Collection::Doctors, "specialization", "Cardiology").await.unwrap(),
            2
        );
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL pointing at a PostgreSQL server"]
    async fn test_user_email_is_unique(pool: PgPool) {
        let store = PgDocumentStore::new(pool);
        store
            .insert(Collection::Users, json!({"emailAddress": "a@b.lk", "NIC": "123456789V"}))
            .await
            .unwrap();
        let err = store
            .insert(Collection::Users, json!({"emailAddress": "a@b.lk", "NIC": "200012345678"}))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
