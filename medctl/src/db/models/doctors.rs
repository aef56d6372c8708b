//! Database models for doctors.

use serde::{Deserialize, Serialize};

use super::Record;
use crate::api::models::doctors::DoctorCreate;

/// Stored body of a doctor document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub doctor_name: String,
    pub specialization: String,
    pub contact_number: String,
    pub available_hours: String,
}

impl From<DoctorCreate> for Doctor {
    fn from(api: DoctorCreate) -> Self {
        Self {
            doctor_name: api.doctor_name.trim().to_string(),
            specialization: api.specialization.trim().to_string(),
            contact_number: api.contact_number,
            available_hours: api.available_hours,
        }
    }
}

pub type DoctorCreateDBRequest = Doctor;
pub type DoctorUpdateDBRequest = Doctor;
pub type DoctorDBResponse = Record<Doctor>;
