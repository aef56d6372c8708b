//! Repository implementations for store access.
//!
//! This module provides a repository struct for each document collection.
//! Repositories follow a consistent pattern and implement the [`Repository`] trait.
//!
//! # Design Pattern
//!
//! Each repository:
//! - Borrows a [`DocumentStore`](crate::db::store::DocumentStore) for the duration of a request
//! - Provides strongly-typed CRUD operations
//! - Serializes its records to the collection's JSON body and back
//! - Returns domain models from [`crate::db::models`]
//!
//! # Available Repositories
//!
//! - [`Doctors`]: Doctors, specialization counts, and the delete guard for referenced doctors
//! - [`Appointments`]: Appointments referencing a doctor
//! - [`Articles`]: Health resource articles and category counts
//! - [`Tickets`]: Support tickets with text search
//! - [`InventoryItems`]: Inventory stock records
//! - [`Users`]: User accounts, uniqueness of email and NIC
//!
//! # Common Pattern
//!
//! ```ignore
//! use medctl::db::handlers::{Doctors, Repository};
//!
//! async fn example(state: &medctl::AppState) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut repo = Doctors::new(state.store.as_ref());
//!     let doctors = repo.list(&()).await?;
//!     Ok(())
//! }
//! ```

pub mod appointments;
pub mod articles;
pub mod doctors;
pub mod inventory;
pub mod repository;
pub mod tickets;
pub mod users;

pub use appointments::Appointments;
pub use articles::Articles;
pub use doctors::Doctors;
pub use inventory::InventoryItems;
pub use repository::Repository;
pub use tickets::Tickets;
pub use users::Users;
