//! Data layer for record persistence and access.
//!
//! Records are JSON documents grouped into collections. The typed repositories
//! sit on top of a pluggable [`store::DocumentStore`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - typed CRUD per collection)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - stored document bodies)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────────────────┐
//! │ DocumentStore            │  (PostgreSQL JSONB table, or in-memory)
//! └─────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations for CRUD operations
//! - [`models`]: Document bodies and typed records
//! - [`store`]: Storage backends
//! - [`errors`]: Store-specific error types
//!
//! # Consistency
//!
//! Each write touches a single document and is atomic on its own. Cross-document
//! checks, such as an appointment's doctor reference or user email uniqueness, are
//! read-then-write and not transactional. PostgreSQL unique indexes back the user
//! uniqueness rules.
//!
//! # Migrations
//!
//! Migrations are managed by SQLx and located in the `migrations/` directory.
//! The [`crate::migrator`] function provides access to the migrator:
//!
//! ```ignore
//! medctl::migrator().run(&pool).await?;
//! ```

pub mod errors;
pub mod handlers;
pub mod models;
pub mod store;
