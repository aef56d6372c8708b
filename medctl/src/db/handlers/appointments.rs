//! Repository for appointments.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::instrument;

use crate::db::errors::Result;
use crate::db::handlers::repository::Repository;
use crate::db::models::Record;
use crate::db::models::appointments::{AppointmentCreateDBRequest, AppointmentDBResponse, AppointmentUpdateDBRequest};
use crate::db::store::{Collection, DocumentStore};
use crate::types::{AppointmentId, abbrev_uuid};

pub struct Appointments<'s> {
    store: &'s dyn DocumentStore,
}

impl<'s> Appointments<'s> {
    pub fn new(store: &'s dyn DocumentStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<'s> Repository for Appointments<'s> {
    type CreateRequest = AppointmentCreateDBRequest;
    type UpdateRequest = AppointmentUpdateDBRequest;
    type Response = AppointmentDBResponse;
    type Id = AppointmentId;
    type Filter = ();

    #[instrument(skip(self, request), fields(doctor_id = %abbrev_uuid(&request.doctor)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let document = self
            .store
            .insert(Collection::Appointments, serde_json::to_value(request)?)
            .await?;
        Record::try_from(document)
    }

    #[instrument(skip(self), fields(appointment_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        self.store
            .find_by_id(Collection::Appointments, id)
            .await?
            .map(Record::try_from)
            .transpose()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let documents = self.store.find_by_ids(Collection::Appointments, &ids).await?;
        Ok(Record::from_documents(documents)?
            .into_iter()
            .map(|appointment: AppointmentDBResponse| (appointment.id, appointment))
            .collect())
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let documents = self.store.find_all(Collection::Appointments).await?;
        Record::from_documents(documents)
    }

    #[instrument(skip(self), fields(appointment_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        self.store.delete(Collection::Appointments, id).await
    }

    #[instrument(skip(self, request), fields(appointment_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let document = self
            .store
            .replace(Collection::Appointments, id, serde_json::to_value(request)?)
            .await?;
        Record::try_from(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::errors::DbError;
    use crate::db::models::appointments::Appointment;
    use crate::db::store::MemoryDocumentStore;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn appointment(doctor: Uuid, time: &str) -> Appointment {
        Appointment {
            name: "Kamala".to_string(),
            age: 34,
            contact: "0712345678".to_string(),
            doctor,
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            time: time.to_string(),
            email: "kamala@example.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_doctor_reference_is_stored_as_text() {
        let store = MemoryDocumentStore::new();
        let mut repo = Appointments::new(&store);
        let doctor = Uuid::new_v4();
        repo.create(&appointment(doctor, "10:00")).await.unwrap();

        let count = store
            .count_by_field(Collection::Appointments, "doctor", &doctor.to_string())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_semantics() {
        let store = MemoryDocumentStore::new();
        let mut repo = Appointments::new(&store);
        let doctor = Uuid::new_v4();
        let created = repo.create(&appointment(doctor, "10:00")).await.unwrap();

        assert!(matches!(
            repo.update(created.id, &appointment(doctor, "10:00")).await,
            Err(DbError::Unchanged)
        ));
        let moved = repo.update(created.id, &appointment(doctor, "11:30")).await.unwrap();
        assert_eq!(moved.data.time, "11:30");

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
    }
}
