//! Repository for doctors.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::instrument;

use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::Repository;
use crate::db::models::Record;
use crate::db::models::doctors::{DoctorCreateDBRequest, DoctorDBResponse, DoctorUpdateDBRequest};
use crate::db::store::{Collection, DocumentStore};
use crate::types::{DoctorId, Operation, abbrev_uuid};

/// Grouping key for specialization counts
const SPECIALIZATION_FIELD: &str = "specialization";
/// Appointment field that references a doctor
const APPOINTMENT_DOCTOR_FIELD: &str = "doctor";

pub struct Doctors<'s> {
    store: &'s dyn DocumentStore,
}

impl<'s> Doctors<'s> {
    pub fn new(store: &'s dyn DocumentStore) -> Self {
        Self { store }
    }

    /// Number of doctors per specialization, ordered by specialization
    #[instrument(skip(self), err)]
    pub async fn specialization_counts(&mut self) -> Result<Vec<(String, i64)>> {
        self.store.group_count(Collection::Doctors, SPECIALIZATION_FIELD).await
    }
}

#[async_trait]
impl<'s> Repository for Doctors<'s> {
    type CreateRequest = DoctorCreateDBRequest;
    type UpdateRequest = DoctorUpdateDBRequest;
    type Response = DoctorDBResponse;
    type Id = DoctorId;
    type Filter = ();

    #[instrument(skip(self, request), fields(doctor_name = %request.doctor_name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let document = self.store.insert(Collection::Doctors, serde_json::to_value(request)?).await?;
        Record::try_from(document)
    }

    #[instrument(skip(self), fields(doctor_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        self.store
            .find_by_id(Collection::Doctors, id)
            .await?
            .map(Record::try_from)
            .transpose()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let documents = self.store.find_by_ids(Collection::Doctors, &ids).await?;
        Ok(Record::from_documents(documents)?
            .into_iter()
            .map(|doctor: DoctorDBResponse| (doctor.id, doctor))
            .collect())
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let documents = self.store.find_all(Collection::Doctors).await?;
        Record::from_documents(documents)
    }

    /// Refuses to delete a doctor that appointments still reference
    #[instrument(skip(self), fields(doctor_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let references = self
            .store
            .count_by_field(Collection::Appointments, APPOINTMENT_DOCTOR_FIELD, &id.to_string())
            .await?;
        if references > 0 {
            return Err(DbError::ProtectedEntity {
                operation: Operation::Delete,
                reason: format!("referenced by {references} appointment(s)"),
                entity_type: "doctor".to_string(),
                entity_id: Some(id.to_string()),
            });
        }

        self.store.delete(Collection::Doctors, id).await
    }

    #[instrument(skip(self, request), fields(doctor_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let document = self
            .store
            .replace(Collection::Doctors, id, serde_json::to_value(request)?)
            .await?;
        Record::try_from(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::doctors::Doctor;
    use crate::db::store::MemoryDocumentStore;
    use serde_json::json;
    use uuid::Uuid;

    fn doctor(name: &str, specialization: &str) -> Doctor {
        Doctor {
            doctor_name: name.to_string(),
            specialization: specialization.to_string(),
            contact_number: "0771234567".to_string(),
            available_hours: "9-5".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_get_update_delete() {
        let store = MemoryDocumentStore::new();
        let mut repo = Doctors::new(&store);

        let created = repo.create(&doctor("Perera", "Cardiology")).await.unwrap();
        assert_eq!(created.data.doctor_name, "Perera");

        let fetched = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);

        let updated = repo.update(created.id, &doctor("Perera", "Neurology")).await.unwrap();
        assert_eq!(updated.data.specialization, "Neurology");

        assert!(matches!(
            repo.update(created.id, &doctor("Perera", "Neurology")).await,
            Err(DbError::Unchanged)
        ));
        assert!(matches!(
            repo.update(Uuid::new_v4(), &doctor("Perera", "Neurology")).await,
            Err(DbError::NotFound)
        ));

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_refused_while_referenced() {
        let store = MemoryDocumentStore::new();
        let mut repo = Doctors::new(&store);
        let created = repo.create(&doctor("Silva", "Dermatology")).await.unwrap();

        let appointment = store
            .insert(Collection::Appointments, json!({"doctor": created.id.to_string()}))
            .await
            .unwrap();

        let err = repo.delete(created.id).await.unwrap_err();
        assert!(matches!(err, DbError::ProtectedEntity { operation: Operation::Delete, .. }));

        store.delete(Collection::Appointments, appointment.id).await.unwrap();
        assert!(repo.delete(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_specialization_counts_and_bulk() {
        let store = MemoryDocumentStore::new();
        let mut repo = Doctors::new(&store);
        let a = repo.create(&doctor("A", "Cardiology")).await.unwrap();
        let b = repo.create(&doctor("B", "Cardiology")).await.unwrap();
        repo.create(&doctor("C", "ENT")).await.unwrap();

        let counts = repo.specialization_counts().await.unwrap();
        assert_eq!(counts, vec![("Cardiology".to_string(), 2), ("ENT".to_string(), 1)]);

        let bulk = repo.get_bulk(vec![a.id, b.id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(bulk.len(), 2);
        assert_eq!(bulk[&b.id].data.doctor_name, "B");

        assert_eq!(repo.list(&()).await.unwrap().len(), 3);
    }
}
