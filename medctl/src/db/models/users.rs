//! Database models for users.

use serde::{Deserialize, Serialize};

use super::Record;
use crate::api::models::users::{Role, UserProfile};

/// Stored body of a user document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub role: Role,
    /// Argon2 PHC string; absent for accounts that cannot log in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub profile: UserProfile,
    pub role: Role,
    pub password_hash: Option<String>,
}

/// Database request for replacing a user's profile
#[derive(Debug, Clone)]
pub struct UserUpdateDBRequest {
    pub profile: UserProfile,
    /// New password hash (None keeps the current one)
    pub password_hash: Option<String>,
}

pub type UserDBResponse = Record<User>;
