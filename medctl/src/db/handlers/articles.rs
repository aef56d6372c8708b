//! Repository for health resource articles.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tracing::instrument;

use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::Repository;
use crate::db::models::Record;
use crate::db::models::articles::{ArticleDBResponse, ArticleWriteDBRequest};
use crate::db::store::{Collection, DocumentStore};
use crate::types::{ArticleId, abbrev_uuid};

const CATEGORY_FIELD: &str = "category";

pub struct Articles<'s> {
    store: &'s dyn DocumentStore,
}

impl<'s> Articles<'s> {
    pub fn new(store: &'s dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Number of articles per category, ordered by category
    #[instrument(skip(self), err)]
    pub async fn category_counts(&mut self) -> Result<Vec<(String, i64)>> {
        self.store.group_count(Collection::Articles, CATEGORY_FIELD).await
    }
}

#[async_trait]
impl<'s> Repository for Articles<'s> {
    type CreateRequest = ArticleWriteDBRequest;
    type UpdateRequest = ArticleWriteDBRequest;
    type Response = ArticleDBResponse;
    type Id = ArticleId;
    type Filter = ();

    #[instrument(skip(self, request), fields(title = %request.title), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let article = request.clone().into_article(Utc::now());
        let document = self.store.insert(Collection::Articles, serde_json::to_value(&article)?).await?;
        Record::try_from(document)
    }

    #[instrument(skip(self), fields(article_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        self.store
            .find_by_id(Collection::Articles, id)
            .await?
            .map(Record::try_from)
            .transpose()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let documents = self.store.find_by_ids(Collection::Articles, &ids).await?;
        Ok(Record::from_documents(documents)?
            .into_iter()
            .map(|article: ArticleDBResponse| (article.id, article))
            .collect())
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let documents = self.store.find_all(Collection::Articles).await?;
        Record::from_documents(documents)
    }

    #[instrument(skip(self), fields(article_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        self.store.delete(Collection::Articles, id).await
    }

    /// Keeps the stored publish date when the request has none
    #[instrument(skip(self, request), fields(article_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let existing = self.get_by_id(id).await?.ok_or(DbError::NotFound)?;
        let article = request.clone().into_article(existing.data.publish_date);
        let document = self
            .store
            .replace(Collection::Articles, id, serde_json::to_value(&article)?)
            .await?;
        Record::try_from(document)
    }
}
