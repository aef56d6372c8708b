//! HTTP request handlers for all API endpoints.
//!
//! Each submodule handles one resource. Handlers receive the raw JSON body,
//! run it through the declarative validator for that resource, and only then
//! build the typed request, so a single response can list every missing and
//! malformed field.
//!
//! - [`doctors`]: Doctor CRUD and specialization counts
//! - [`appointments`]: Appointment booking with doctor resolution and confirmation email
//! - [`articles`]: Health resource articles (`/resources`) and category counts
//! - [`tickets`]: Support tickets with search
//! - [`inventory`]: Inventory items, stock report and stock check
//! - [`users`]: Registration, login and user CRUD

use uuid::Uuid;

use crate::db::errors::DbError;
use crate::errors::Error;

pub mod appointments;
pub mod articles;
pub mod doctors;
pub mod inventory;
pub mod tickets;
pub mod users;

/// Parse an identifier taken from a path or a request body
pub(crate) fn parse_id(resource: &str, raw: &str) -> Result<Uuid, Error> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::BadRequest {
        message: format!("Invalid {resource} ID"),
    })
}

/// Report a store-level `NotFound` as a missing `resource`
pub(crate) fn not_found_as(resource: &'static str, id: Uuid) -> impl FnOnce(DbError) -> Error {
    move |e| match e {
        DbError::NotFound => Error::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        },
        other => Error::Database(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id("doctor", &id.to_string()).unwrap(), id);

        let err = parse_id("doctor", "12345").unwrap_err();
        assert!(matches!(err, Error::BadRequest { ref message } if message == "Invalid doctor ID"));
    }

    #[test]
    fn test_not_found_as_keeps_other_errors() {
        let id = Uuid::new_v4();
        let err = not_found_as("Doctor", id)(DbError::NotFound);
        assert_eq!(err.user_message(), "Doctor not found");

        let err = not_found_as("Doctor", id)(DbError::Unchanged);
        assert!(matches!(err, Error::Database(DbError::Unchanged)));
    }
}
