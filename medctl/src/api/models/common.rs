//! Response bodies shared by every resource.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation::{FieldError, ValidationErrors};

/// Plain acknowledgement, also used for aggregations over empty collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Doctor deleted successfully")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Error body returned for every non-2xx response.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[schema(example = "The following fields are required")]
    pub message: String,
    /// Fields that were absent or empty (validation failures only)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = json!(["doctorName", "contactNumber"]))]
    pub missing_fields: Option<Vec<String>>,
    /// Fields that were supplied in the wrong format (validation failures only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_fields: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            missing_fields: None,
            invalid_fields: None,
        }
    }
}

impl From<&ValidationErrors> for ErrorResponse {
    fn from(errors: &ValidationErrors) -> Self {
        Self {
            message: errors.message().to_string(),
            // Always present on validation failures so clients can rely on it
            missing_fields: Some(errors.missing_fields.clone()),
            invalid_fields: (!errors.invalid_fields.is_empty()).then(|| errors.invalid_fields.clone()),
        }
    }
}
