//! API request and response data models.
//!
//! API models are distinct from the stored document bodies in [`crate::db::models`], and
//! every request type carries the field specification its handler validates against.
//! Responses convert from typed records with `From`.
//!
//! - [`doctors`], [`appointments`], [`articles`], [`tickets`], [`inventory`], [`users`]:
//!   per-resource payloads
//! - [`common`]: message and error bodies shared by every resource
//!
//! # Example
//!
//! ```ignore
//! use medctl::api::models::doctors::{DoctorCreate, DoctorResponse};
//!
//! let create_req: DoctorCreate = serde_json::from_str(json_str)?;
//! let response: DoctorResponse = record.into();
//! ```

pub mod appointments;
pub mod articles;
pub mod common;
pub mod doctors;
pub mod inventory;
pub mod tickets;
pub mod users;
