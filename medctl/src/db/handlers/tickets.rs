//! Repository for support tickets.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tracing::instrument;

use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::Repository;
use crate::db::models::Record;
use crate::db::models::tickets::{Ticket, TicketCreateDBRequest, TicketDBResponse, TicketFilter, TicketUpdateDBRequest};
use crate::db::store::{Collection, DocumentStore};
use crate::types::{TicketId, abbrev_uuid};

pub struct Tickets<'s> {
    store: &'s dyn DocumentStore,
}

impl<'s> Tickets<'s> {
    pub fn new(store: &'s dyn DocumentStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<'s> Repository for Tickets<'s> {
    type CreateRequest = TicketCreateDBRequest;
    type UpdateRequest = TicketUpdateDBRequest;
    type Response = TicketDBResponse;
    type Id = TicketId;
    type Filter = TicketFilter;

    #[instrument(skip(self, request), fields(priority = request.priority.as_str()), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let ticket = Ticket {
            email: request.email.clone(),
            issue_title: request.issue_title.clone(),
            issue_description: request.issue_description.clone(),
            status: request.status,
            priority: request.priority,
            created_date: Utc::now(),
        };
        let document = self.store.insert(Collection::Tickets, serde_json::to_value(&ticket)?).await?;
        Record::try_from(document)
    }

    #[instrument(skip(self), fields(ticket_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        self.store
            .find_by_id(Collection::Tickets, id)
            .await?
            .map(Record::try_from)
            .transpose()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let documents = self.store.find_by_ids(Collection::Tickets, &ids).await?;
        Ok(Record::from_documents(documents)?
            .into_iter()
            .map(|ticket: TicketDBResponse| (ticket.id, ticket))
            .collect())
    }

    /// Lists all tickets, or those matching the search term when one is given
    #[instrument(skip(self, filter), fields(search = filter.search.as_deref()), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let documents = self.store.find_all(Collection::Tickets).await?;
        let tickets: Vec<TicketDBResponse> = Record::from_documents(documents)?;

        Ok(match filter.search.as_deref().map(str::trim).filter(|term| !term.is_empty()) {
            Some(term) => tickets.into_iter().filter(|ticket| ticket.data.matches(term)).collect(),
            None => tickets,
        })
    }

    #[instrument(skip(self), fields(ticket_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        self.store.delete(Collection::Tickets, id).await
    }

    #[instrument(skip(self, request), fields(ticket_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let existing = self.get_by_id(id).await?.ok_or(DbError::NotFound)?;
        let ticket = Ticket {
            issue_title: request.issue_title.clone(),
            issue_description: request.issue_description.clone(),
            status: request.status,
            priority: request.priority,
            ..existing.data
        };
        let document = self
            .store
            .replace(Collection::Tickets, id, serde_json::to_value(&ticket)?)
            .await?;
        Record::try_from(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::tickets::{TicketPriority, TicketStatus};
    use crate::db::store::MemoryDocumentStore;

    fn open(title: &str, description: &str, priority: TicketPriority) -> TicketCreateDBRequest {
        TicketCreateDBRequest {
            email: "p@example.com".to_string(),
            issue_title: title.to_string(),
            issue_description: description.to_string(),
            status: TicketStatus::default(),
            priority,
        }
    }

    #[tokio::test]
    async fn test_search_filters_tickets() {
        let store = MemoryDocumentStore::new();
        let mut repo = Tickets::new(&store);
        repo.create(&open("Login broken", "Cannot sign in", TicketPriority::High))
            .await
            .unwrap();
        repo.create(&open("Slow page", "Reports take ages", TicketPriority::Low))
            .await
            .unwrap();

        let all = repo.list(&TicketFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let found = repo
            .list(&TicketFilter {
                search: Some("SIGN".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].data.issue_title, "Login broken");

        let by_priority = repo
            .list(&TicketFilter {
                search: Some("low".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(by_priority.len(), 1);

        let blank = repo
            .list(&TicketFilter {
                search: Some("  ".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(blank.len(), 2);
    }

    #[tokio::test]
    async fn test_update_keeps_submitter_and_created_date() {
        let store = MemoryDocumentStore::new();
        let mut repo = Tickets::new(&store);
        let created = repo
            .create(&open("Login broken", "Cannot sign in", TicketPriority::Medium))
            .await
            .unwrap();

        let updated = repo
            .update(created.id, &TicketUpdateDBRequest {
                issue_title: "Login broken".to_string(),
                issue_description: "Cannot sign in".to_string(),
                status: TicketStatus::Resolved,
                priority: TicketPriority::Medium,
            })
            .await
            .unwrap();
        assert_eq!(updated.data.status, TicketStatus::Resolved);
        assert_eq!(updated.data.email, created.data.email);
        assert_eq!(updated.data.created_date, created.data.created_date);
    }
}
