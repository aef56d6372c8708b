//! Database models for appointments.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Record;
use crate::types::DoctorId;

/// Stored body of an appointment document.
///
/// `doctor` is a non-owning reference; the doctor may be deleted only while no
/// appointment points at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub name: String,
    pub age: u32,
    pub contact: String,
    pub doctor: DoctorId,
    pub date: NaiveDate,
    pub time: String,
    pub email: String,
}

pub type AppointmentCreateDBRequest = Appointment;
pub type AppointmentUpdateDBRequest = Appointment;
pub type AppointmentDBResponse = Record<Appointment>;
