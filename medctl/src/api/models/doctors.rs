//! API request/response models for doctors.

use crate::db::models::doctors::DoctorDBResponse;
use crate::types::DoctorId;
use crate::validation::{FieldSpec, Format};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for creating a doctor, also used to fully replace one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorCreate {
    #[schema(example = "Nimal Perera")]
    pub doctor_name: String,
    /// Free-text specialization, used as the grouping key for counts
    #[schema(example = "Cardiology")]
    pub specialization: String,
    /// Ten-digit phone number
    #[schema(example = "0771234567")]
    pub contact_number: String,
    #[schema(example = "Mon-Fri 9:00-13:00")]
    pub available_hours: String,
}

pub type DoctorUpdate = DoctorCreate;

impl DoctorCreate {
    pub const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::truthy("doctorName"),
        FieldSpec::truthy("specialization"),
        FieldSpec::truthy("contactNumber").with(&[Format::Digits(10)]),
        FieldSpec::truthy("availableHours"),
    ];
}

/// A stored doctor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoctorResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: DoctorId,
    pub doctor_name: String,
    pub specialization: String,
    pub contact_number: String,
    pub available_hours: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DoctorDBResponse> for DoctorResponse {
    fn from(db: DoctorDBResponse) -> Self {
        Self {
            id: db.id,
            doctor_name: db.data.doctor_name,
            specialization: db.data.specialization,
            contact_number: db.data.contact_number,
            available_hours: db.data.available_hours,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Number of doctors sharing a specialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SpecializationCount {
    #[schema(example = "Cardiology")]
    pub specialization: String,
    #[schema(example = 3)]
    pub count: i64,
}
