//! API request/response models for users, registration and login.

use crate::db::models::users::UserDBResponse;
use crate::types::UserId;
use crate::validation::{FieldSpec, Format};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Where the dashboard should send this user after login
    pub fn landing_page(&self) -> &'static str {
        match self {
            Role::Admin => "/admin",
            Role::User => "/",
        }
    }
}

/// Personal details shared by registration, update and responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[schema(example = "Mr")]
    pub title: String,
    #[schema(example = "Saman")]
    pub first_name: String,
    #[schema(example = "Jayasuriya")]
    pub last_name: String,
    #[schema(example = "12 Lake Road")]
    pub address: String,
    /// National identity card number
    #[serde(rename = "NIC")]
    #[schema(example = "901234567V")]
    pub nic: String,
    /// Date of birth
    #[serde(rename = "DOB")]
    #[schema(value_type = String, example = "1990-05-17")]
    pub dob: NaiveDate,
    #[schema(example = "+94771234567")]
    pub contact: String,
    #[schema(example = "saman@example.com")]
    pub email_address: String,
    #[schema(example = "Kandy")]
    pub city: String,
    #[schema(example = "Kandy")]
    pub district: String,
}

impl UserProfile {
    /// Email addresses are matched case-insensitively
    pub fn normalized(mut self) -> Self {
        self.email_address = self.email_address.trim().to_lowercase();
        self.nic = self.nic.trim().to_uppercase();
        self
    }
}

const PROFILE_FIELDS: [FieldSpec; 10] = [
    FieldSpec::truthy("title"),
    FieldSpec::truthy("firstName"),
    FieldSpec::truthy("lastName"),
    FieldSpec::truthy("address"),
    FieldSpec::truthy("NIC").with(&[Format::NationalId]),
    FieldSpec::truthy("DOB").with(&[Format::Date]),
    FieldSpec::truthy("contact").with(&[Format::LocalPhone]),
    FieldSpec::truthy("emailAddress").with(&[Format::StrictEmail]),
    FieldSpec::truthy("city"),
    FieldSpec::truthy("district"),
];

/// Registration request
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct UserCreate {
    #[serde(flatten)]
    pub profile: UserProfile,
    /// At least 10 characters with an uppercase and a lowercase letter
    #[schema(example = "CorrectHorse42")]
    pub password: String,
}

impl UserCreate {
    pub const FIELDS: &'static [FieldSpec] = &[
        PROFILE_FIELDS[0],
        PROFILE_FIELDS[1],
        PROFILE_FIELDS[2],
        PROFILE_FIELDS[3],
        PROFILE_FIELDS[4],
        PROFILE_FIELDS[5],
        PROFILE_FIELDS[6],
        PROFILE_FIELDS[7],
        PROFILE_FIELDS[8],
        PROFILE_FIELDS[9],
        FieldSpec::truthy("password").with(&[Format::Password]),
    ];
}

/// Full profile replacement; the password is changed only when supplied
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
pub struct UserUpdate {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub password: Option<String>,
}

impl UserUpdate {
    pub const FIELDS: &'static [FieldSpec] = &[
        PROFILE_FIELDS[0],
        PROFILE_FIELDS[1],
        PROFILE_FIELDS[2],
        PROFILE_FIELDS[3],
        PROFILE_FIELDS[4],
        PROFILE_FIELDS[5],
        PROFILE_FIELDS[6],
        PROFILE_FIELDS[7],
        PROFILE_FIELDS[8],
        PROFILE_FIELDS[9],
        FieldSpec::optional("password").with(&[Format::Password]),
    ];
}

#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "saman@example.com")]
    pub email_address: String,
    pub password: String,
}

impl LoginRequest {
    pub const FIELDS: &'static [FieldSpec] = &[FieldSpec::truthy("emailAddress"), FieldSpec::truthy("password")];
}

/// A stored user; the password hash is never included
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    #[serde(flatten)]
    pub profile: UserProfile,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            profile: db.data.profile,
            role: db.data.role,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    #[schema(example = "Login successful")]
    pub message: String,
    pub user: UserResponse,
    /// `/admin` for administrators, `/` otherwise
    #[schema(example = "/")]
    pub redirect: String,
}
