//! Repository for inventory items.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::instrument;

use crate::db::errors::Result;
use crate::db::handlers::repository::Repository;
use crate::db::models::Record;
use crate::db::models::inventory::{
    InventoryItemCreateDBRequest, InventoryItemDBResponse, InventoryItemUpdateDBRequest,
};
use crate::db::store::{Collection, DocumentStore};
use crate::types::{InventoryItemId, abbrev_uuid};

pub struct InventoryItems<'s> {
    store: &'s dyn DocumentStore,
}

impl<'s> InventoryItems<'s> {
    pub fn new(store: &'s dyn DocumentStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<'s> Repository for InventoryItems<'s> {
    type CreateRequest = InventoryItemCreateDBRequest;
    type UpdateRequest = InventoryItemUpdateDBRequest;
    type Response = InventoryItemDBResponse;
    type Id = InventoryItemId;
    type Filter = ();

    #[instrument(skip(self, request), fields(item_name = %request.item_name, quantity = request.quantity), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let document = self
            .store
            .insert(Collection::InventoryItems, serde_json::to_value(request)?)
            .await?;
        Record::try_from(document)
    }

    #[instrument(skip(self), fields(item_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        self.store
            .find_by_id(Collection::InventoryItems, id)
            .await?
            .map(Record::try_from)
            .transpose()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let documents = self.store.find_by_ids(Collection::InventoryItems, &ids).await?;
        Ok(Record::from_documents(documents)?
            .into_iter()
            .map(|item: InventoryItemDBResponse| (item.id, item))
            .collect())
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let documents = self.store.find_all(Collection::InventoryItems).await?;
        Record::from_documents(documents)
    }

    #[instrument(skip(self), fields(item_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        self.store.delete(Collection::InventoryItems, id).await
    }

    #[instrument(skip(self, request), fields(item_id = %abbrev_uuid(&id), quantity = request.quantity), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let document = self
            .store
            .replace(Collection::InventoryItems, id, serde_json::to_value(request)?)
            .await?;
        Record::try_from(document)
    }
}
