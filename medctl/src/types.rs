//! Common type definitions shared across the store, API and notification layers.
//!
//! # ID Types
//!
//! All record IDs are UUIDs wrapped in type aliases so signatures say which
//! collection an identifier belongs to:
//!
//! - [`DoctorId`], [`AppointmentId`], [`ArticleId`], [`TicketId`],
//!   [`InventoryItemId`], [`UserId`]
//!
//! # Operations
//!
//! [`Operation`] names the write being attempted when the store refuses it (see
//! [`crate::db::errors::DbError::ProtectedEntity`]).
//!
//! # Utility Functions
//!
//! - [`abbrev_uuid`]: Abbreviate UUIDs to first 8 chars for logging

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// Type aliases for IDs
pub type DoctorId = Uuid;
pub type AppointmentId = Uuid;
pub type ArticleId = Uuid;
pub type TicketId = Uuid;
pub type InventoryItemId = Uuid;
pub type UserId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

/// Write operations that the store can refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviates_to_first_eight_chars() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(abbrev_uuid(&id), "550e8400");
    }
}
