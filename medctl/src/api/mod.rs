//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//! - **[`extractors`]**: Request extractors whose rejections use the API error body
//!
//! # API Structure
//!
//! - **Doctors** (`/doctors/*`): Doctor records and specialization counts
//! - **Appointments** (`/appointments/*`): Bookings that reference a doctor
//! - **Health resources** (`/resources/*`): Articles and category counts
//! - **Tickets** (`/tickets/*`): Support tickets and search
//! - **Inventory** (`/inventory/*`): Stock items, stock report and stock check
//! - **Users** (`/users/*`): Registration, login and account management
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with `utoipa` annotations. The document is served at
//! `/api-docs/openapi.json` and rendered at `/docs` when the server is running.

pub mod extractors;
pub mod handlers;
pub mod models;
