//! Request extractors shared by the handlers.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde_json::Value;

use crate::errors::Error;

/// A JSON request body, left untyped until it has been validated.
///
/// Unlike `Json<Value>`, a body that is not JSON, or a request without a JSON content type,
/// is rejected through [`Error`], so the client gets the usual `{message}` body.
#[derive(Debug, Clone)]
pub struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
