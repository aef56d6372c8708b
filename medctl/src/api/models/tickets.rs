//! API request/response models for support tickets.

use crate::db::models::tickets::TicketDBResponse;
use crate::types::TicketId;
use crate::validation::{FieldSpec, Format};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

const TITLE_MAX_CHARS: usize = 100;
const DESCRIPTION_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TicketStatus {
    #[default]
    Open,
    #[serde(rename = "In Progress", alias = "In-Progress")]
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub const ACCEPTED: &'static [&'static str] = &["Open", "In Progress", "In-Progress", "Resolved", "Closed"];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Resolved => "Resolved",
            TicketStatus::Closed => "Closed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TicketPriority {
    pub const ACCEPTED: &'static [&'static str] = &["Low", "Medium", "High"];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Low => "Low",
            TicketPriority::Medium => "Medium",
            TicketPriority::High => "High",
        }
    }
}

/// Request body for opening a ticket
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketCreate {
    /// Submitter email
    #[schema(example = "patient@example.com")]
    pub email: String,
    #[schema(example = "Cannot download lab report", max_length = 100)]
    pub issue_title: String,
    #[schema(example = "The download button does nothing on the results page", max_length = 500)]
    pub issue_description: String,
    /// Defaults to Open
    pub status: Option<TicketStatus>,
    /// Defaults to Medium
    pub priority: Option<TicketPriority>,
}

impl TicketCreate {
    pub const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::truthy("email").with(&[Format::Email]),
        FieldSpec::truthy("issueTitle").with(&[Format::MaxChars(TITLE_MAX_CHARS)]),
        FieldSpec::truthy("issueDescription").with(&[Format::MaxChars(DESCRIPTION_MAX_CHARS)]),
        FieldSpec::optional("status").with(&[Format::OneOf(TicketStatus::ACCEPTED)]),
        FieldSpec::optional("priority").with(&[Format::OneOf(TicketPriority::ACCEPTED)]),
    ];
}

/// Request body for replacing a ticket's mutable fields
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketUpdate {
    #[schema(max_length = 100)]
    pub issue_title: String,
    #[schema(max_length = 500)]
    pub issue_description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
}

impl TicketUpdate {
    pub const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::truthy("issueTitle").with(&[Format::MaxChars(TITLE_MAX_CHARS)]),
        FieldSpec::truthy("issueDescription").with(&[Format::MaxChars(DESCRIPTION_MAX_CHARS)]),
        FieldSpec::truthy("status").with(&[Format::OneOf(TicketStatus::ACCEPTED)]),
        FieldSpec::truthy("priority").with(&[Format::OneOf(TicketPriority::ACCEPTED)]),
    ];
}

/// Query parameters for listing tickets
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct TicketSearchQuery {
    /// Case-insensitive substring matched against title, description, status and priority
    pub q: Option<String>,
}

/// A stored ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: TicketId,
    pub email: String,
    pub issue_title: String,
    pub issue_description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub created_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TicketDBResponse> for TicketResponse {
    fn from(db: TicketDBResponse) -> Self {
        Self {
            id: db.id,
            email: db.data.email,
            issue_title: db.data.issue_title,
            issue_description: db.data.issue_description,
            status: db.data.status,
            priority: db.data.priority,
            created_date: db.data.created_date,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
