//! API request/response models for appointments.

use crate::api::models::doctors::DoctorResponse;
use crate::db::models::appointments::{Appointment, AppointmentDBResponse};
use crate::types::{AppointmentId, DoctorId};
use crate::validation::{FieldSpec, Format};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use utoipa::ToSchema;

/// Request body for booking an appointment, also used to fully replace one.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AppointmentCreate {
    /// Patient name
    #[schema(example = "Kamala Silva")]
    pub name: String,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[schema(value_type = u32, example = 34)]
    pub age: u32,
    /// Ten-digit phone number
    #[schema(example = "0712345678")]
    pub contact: String,
    /// Identifier of the doctor to see
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub doctor: String,
    #[schema(value_type = String, example = "2025-03-14")]
    pub date: NaiveDate,
    #[schema(example = "10:30 AM")]
    pub time: String,
    /// Where the confirmation email is sent
    #[schema(example = "kamala@example.com")]
    pub email: String,
}

pub type AppointmentUpdate = AppointmentCreate;

impl AppointmentCreate {
    pub const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::truthy("name"),
        FieldSpec::truthy("age").with(&[Format::PositiveInteger]),
        FieldSpec::truthy("contact").with(&[Format::Digits(10)]),
        FieldSpec::truthy("doctor"),
        FieldSpec::truthy("date").with(&[Format::Date]),
        FieldSpec::truthy("time"),
        FieldSpec::truthy("email").with(&[Format::Email]),
    ];

    /// Build the stored body once the doctor reference has been resolved
    pub fn into_appointment(self, doctor: DoctorId) -> Appointment {
        Appointment {
            name: self.name.trim().to_string(),
            age: self.age,
            contact: self.contact,
            doctor,
            date: self.date,
            time: self.time,
            email: self.email.trim().to_string(),
        }
    }
}

/// A stored appointment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: AppointmentId,
    pub name: String,
    pub age: u32,
    pub contact: String,
    #[schema(value_type = String, format = "uuid")]
    pub doctor: DoctorId,
    /// The referenced doctor, or null when it no longer exists
    pub doctor_details: Option<DoctorResponse>,
    #[schema(value_type = String, example = "2025-03-14")]
    pub date: NaiveDate,
    pub time: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AppointmentResponse {
    pub fn new(db: AppointmentDBResponse, doctor_details: Option<DoctorResponse>) -> Self {
        Self {
            id: db.id,
            name: db.data.name,
            age: db.data.age,
            contact: db.data.contact,
            doctor: db.data.doctor,
            doctor_details,
            date: db.data.date,
            time: db.data.time,
            email: db.data.email,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
