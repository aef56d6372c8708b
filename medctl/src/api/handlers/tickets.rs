use crate::AppState;
use crate::api::extractors::JsonBody;
use crate::api::handlers::{not_found_as, parse_id};
use crate::api::models::common::{ErrorResponse, MessageResponse};
use crate::api::models::tickets::{TicketCreate, TicketResponse, TicketSearchQuery, TicketUpdate};
use crate::db::handlers::{Repository, Tickets};
use crate::db::models::tickets::{TicketCreateDBRequest, TicketFilter, TicketUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::validation::validate_into;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

#[utoipa::path(
    post,
    path = "/tickets",
    tag = "tickets",
    summary = "Open a support ticket",
    request_body = TicketCreate,
    responses(
        (status = 201, description = "Ticket created", body = TicketResponse),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_ticket(State(state): State<AppState>, JsonBody(body): JsonBody) -> Result<(StatusCode, Json<TicketResponse>)> {
    let request: TicketCreate = validate_into(TicketCreate::FIELDS, body)?;

    let ticket = Tickets::new(state.store.as_ref())
        .create(&TicketCreateDBRequest::from(request))
        .await?;

    Ok((StatusCode::CREATED, Json(ticket.into())))
}

#[utoipa::path(
    get,
    path = "/tickets",
    tag = "tickets",
    summary = "List or search tickets",
    params(TicketSearchQuery),
    responses(
        (status = 200, description = "Matching tickets, oldest first", body = Vec<TicketResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_tickets(State(state): State<AppState>, Query(query): Query<TicketSearchQuery>) -> Result<Json<Vec<TicketResponse>>> {
    let filter = TicketFilter { search: query.q };
    let tickets = Tickets::new(state.store.as_ref()).list(&filter).await?;
    Ok(Json(tickets.into_iter().map(TicketResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/tickets/search",
    tag = "tickets",
    summary = "Search tickets",
    params(TicketSearchQuery),
    responses(
        (status = 200, description = "Matching tickets, oldest first", body = Vec<TicketResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn search_tickets(state: State<AppState>, query: Query<TicketSearchQuery>) -> Result<Json<Vec<TicketResponse>>> {
    list_tickets(state, query).await
}

#[utoipa::path(
    get,
    path = "/tickets/{id}",
    tag = "tickets",
    summary = "Get a ticket",
    params(("id" = String, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket found", body = TicketResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Ticket not found", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_ticket(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<TicketResponse>> {
    let id = parse_id("ticket", &id)?;

    match Tickets::new(state.store.as_ref()).get_by_id(id).await? {
        Some(ticket) => Ok(Json(ticket.into())),
        None => Err(Error::NotFound {
            resource: "Ticket".to_string(),
            id: id.to_string(),
        }),
    }
}

#[utoipa::path(
    put,
    path = "/tickets/{id}",
    tag = "tickets",
    summary = "Update a ticket",
    description = "Replaces title, description, status and priority. The submitter email and creation date are kept.",
    params(("id" = String, Path, description = "Ticket ID")),
    request_body = TicketUpdate,
    responses(
        (status = 200, description = "Ticket updated", body = TicketResponse),
        (status = 400, description = "Malformed ID or fields, or nothing changed", body = ErrorResponse),
        (status = 404, description = "Ticket not found", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<TicketResponse>> {
    let id = parse_id("ticket", &id)?;
    let request: TicketUpdate = validate_into(TicketUpdate::FIELDS, body)?;

    let ticket = Tickets::new(state.store.as_ref())
        .update(id, &TicketUpdateDBRequest::from(request))
        .await
        .map_err(not_found_as("Ticket", id))?;

    Ok(Json(ticket.into()))
}

#[utoipa::path(
    delete,
    path = "/tickets/{id}",
    tag = "tickets",
    summary = "Delete a ticket",
    params(("id" = String, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket deleted", body = MessageResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Ticket not found", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_ticket(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<MessageResponse>> {
    let id = parse_id("ticket", &id)?;

    if !Tickets::new(state.store.as_ref()).delete(id).await? {
        return Err(Error::NotFound {
            resource: "Ticket".to_string(),
            id: id.to_string(),
        });
    }

    Ok(Json(MessageResponse::new("Ticket deleted successfully")))
}
