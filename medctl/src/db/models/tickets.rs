//! Database models for support tickets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Record;
use crate::api::models::tickets::{TicketCreate, TicketPriority, TicketStatus, TicketUpdate};

/// Stored body of a ticket document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub email: String,
    pub issue_title: String,
    pub issue_description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub created_date: DateTime<Utc>,
}

impl Ticket {
    /// Case-insensitive substring match over title, description, status and priority
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        [
            self.issue_title.as_str(),
            self.issue_description.as_str(),
            self.status.as_str(),
            self.priority.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
    }
}

/// Database request for opening a ticket
#[derive(Debug, Clone)]
pub struct TicketCreateDBRequest {
    pub email: String,
    pub issue_title: String,
    pub issue_description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
}

impl From<TicketCreate> for TicketCreateDBRequest {
    fn from(api: TicketCreate) -> Self {
        Self {
            email: api.email,
            issue_title: api.issue_title,
            issue_description: api.issue_description,
            status: api.status.unwrap_or_default(),
            priority: api.priority.unwrap_or_default(),
        }
    }
}

/// Database request for replacing a ticket's mutable fields. The submitter email
/// and creation date are kept.
#[derive(Debug, Clone)]
pub struct TicketUpdateDBRequest {
    pub issue_title: String,
    pub issue_description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
}

impl From<TicketUpdate> for TicketUpdateDBRequest {
    fn from(api: TicketUpdate) -> Self {
        Self {
            issue_title: api.issue_title,
            issue_description: api.issue_description,
            status: api.status,
            priority: api.priority,
        }
    }
}

/// Filter for listing tickets
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub search: Option<String>,
}

pub type TicketDBResponse = Record<Ticket>;

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket() -> Ticket {
        Ticket {
            email: "p@example.com".to_string(),
            issue_title: "Cannot book appointment".to_string(),
            issue_description: "The form hangs on submit".to_string(),
            status: TicketStatus::InProgress,
            priority: TicketPriority::High,
            created_date: Utc::now(),
        }
    }

    #[test]
    fn test_matches_any_searchable_field() {
        let ticket = ticket();
        assert!(ticket.matches("BOOK"));
        assert!(ticket.matches("hangs"));
        assert!(ticket.matches("in progress"));
        assert!(ticket.matches("high"));
        assert!(!ticket.matches("p@example.com"));
    }
}
