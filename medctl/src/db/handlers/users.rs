//! Repository for users.

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::instrument;

use crate::api::models::users::UserProfile;
use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::Repository;
use crate::db::models::Record;
use crate::db::models::users::{User, UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest};
use crate::db::store::{Collection, DocumentStore};
use crate::types::{UserId, abbrev_uuid};

const EMAIL_FIELD: &str = "emailAddress";
const NIC_FIELD: &str = "NIC";

pub struct Users<'s> {
    store: &'s dyn DocumentStore,
}

impl<'s> Users<'s> {
    pub fn new(store: &'s dyn DocumentStore) -> Self {
        Self { store }
    }

    #[instrument(skip(self, email), err)]
    pub async fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        self.store
            .find_one_by_field(Collection::Users, EMAIL_FIELD, &email.trim().to_lowercase())
            .await?
            .map(Record::try_from)
            .transpose()
    }

    /// Fail with a unique violation if another user already has this email or NIC
    async fn ensure_unique(&mut self, profile: &UserProfile, except: Option<UserId>) -> Result<()> {
        for (field, value, constraint) in [
            (EMAIL_FIELD, &profile.email_address, "documents_users_email_unique"),
            (NIC_FIELD, &profile.nic, "documents_users_nic_unique"),
        ] {
            let existing = self.store.find_one_by_field(Collection::Users, field, value).await?;
            if existing.is_some_and(|user| Some(user.id) != except) {
                return Err(DbError::UniqueViolation {
                    constraint: Some(constraint.to_string()),
                    table: Some("documents".to_string()),
                    message: format!("a user with this {field} already exists"),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<'s> Repository for Users<'s> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = ();

    #[instrument(skip(self, request), fields(email = %request.profile.email_address), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let profile = request.profile.clone().normalized();
        self.ensure_unique(&profile, None).await?;

        let user = User {
            profile,
            role: request.role,
            password_hash: request.password_hash.clone(),
        };
        let document = self.store.insert(Collection::Users, serde_json::to_value(&user)?).await?;
        Record::try_from(document)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        self.store
            .find_by_id(Collection::Users, id)
            .await?
            .map(Record::try_from)
            .transpose()
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn get_bulk(&mut self, ids: Vec<Self::Id>) -> Result<HashMap<Self::Id, Self::Response>> {
        let documents = self.store.find_by_ids(Collection::Users, &ids).await?;
        Ok(Record::from_documents(documents)?
            .into_iter()
            .map(|user: UserDBResponse| (user.id, user))
            .collect())
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let documents = self.store.find_all(Collection::Users).await?;
        Record::from_documents(documents)
    }

    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        self.store.delete(Collection::Users, id).await
    }

    /// Replaces the profile, keeping the role and, unless a new one is given, the password
    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let existing = self.get_by_id(id).await?.ok_or(DbError::NotFound)?;
        let profile = request.profile.clone().normalized();
        self.ensure_unique(&profile, Some(id)).await?;

        let user = User {
            profile,
            role: existing.data.role,
            password_hash: request.password_hash.clone().or(existing.data.password_hash),
        };
        let document = self
            .store
            .replace(Collection::Users, id, serde_json::to_value(&user)?)
            .await?;
        Record::try_from(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::db::store::MemoryDocumentStore;
    use chrono::NaiveDate;

    fn profile(email: &str, nic: &str) -> UserProfile {
        UserProfile {
            title: "Ms".to_string(),
            first_name: "Nadeesha".to_string(),
            last_name: "Fernando".to_string(),
            address: "4 Temple Road".to_string(),
            nic: nic.to_string(),
            dob: NaiveDate::from_ymd_opt(1995, 2, 11).unwrap(),
            contact: "+94771234567".to_string(),
            email_address: email.to_string(),
            city: "Galle".to_string(),
            district: "Galle".to_string(),
        }
    }

    fn create(email: &str, nic: &str) -> UserCreateDBRequest {
        UserCreateDBRequest {
            profile: profile(email, nic),
            role: Role::User,
            password_hash: Some("hash".to_string()),
        }
    }

    #[tokio::test]
    async fn test_email_and_nic_are_unique() {
        let store = MemoryDocumentStore::new();
        let mut repo = Users::new(&store);
        repo.create(&create("n@example.com", "951234567V")).await.unwrap();

        let by_email = repo.create(&create("N@Example.com", "200012345678")).await.unwrap_err();
        assert!(matches!(by_email, DbError::UniqueViolation { .. }));

        let by_nic = repo.create(&create("other@example.com", "951234567v")).await.unwrap_err();
        assert!(matches!(by_nic, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_lookup_by_email_is_case_insensitive() {
        let store = MemoryDocumentStore::new();
        let mut repo = Users::new(&store);
        let created = repo.create(&create("Mixed@Example.com", "951234567V")).await.unwrap();
        assert_eq!(created.data.profile.email_address, "mixed@example.com");

        let found = repo.get_user_by_email("MIXED@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn test_update_keeps_role_and_password_unless_replaced() {
        let store = MemoryDocumentStore::new();
        let mut repo = Users::new(&store);
        let created = repo.create(&create("n@example.com", "951234567V")).await.unwrap();

        let mut changed = profile("n@example.com", "951234567V");
        changed.city = "Matara".to_string();
        let updated = repo
            .update(created.id, &UserUpdateDBRequest {
                profile: changed.clone(),
                password_hash: None,
            })
            .await
            .unwrap();
        assert_eq!(updated.data.profile.city, "Matara");
        assert_eq!(updated.data.role, Role::User);
        assert_eq!(updated.data.password_hash.as_deref(), Some("hash"));

        let rehashed = repo
            .update(created.id, &UserUpdateDBRequest {
                profile: changed,
                password_hash: Some("new-hash".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(rehashed.data.password_hash.as_deref(), Some("new-hash"));
    }

    #[tokio::test]
    async fn test_update_cannot_take_another_users_email() {
        let store = MemoryDocumentStore::new();
        let mut repo = Users::new(&store);
        repo.create(&create("a@example.com", "951234567V")).await.unwrap();
        let b = repo.create(&create("b@example.com", "200012345678")).await.unwrap();

        let err = repo
            .update(b.id, &UserUpdateDBRequest {
                profile: profile("a@example.com", "200012345678"),
                password_hash: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
