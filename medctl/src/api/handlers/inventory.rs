use crate::AppState;
use crate::api::extractors::JsonBody;
use crate::api::handlers::{not_found_as, parse_id};
use crate::api::models::common::{ErrorResponse, MessageResponse};
use crate::api::models::inventory::{
    InventoryItemCreate, InventoryItemResponse, InventoryItemUpdate, StockCheckResponse, StockReport,
};
use crate::db::handlers::{InventoryItems, Repository};
use crate::db::models::inventory::InventoryItem;
use crate::errors::{Error, Result};
use crate::notifications::Notification;
use crate::validation::validate_into;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;

#[utoipa::path(
    post,
    path = "/inventory",
    tag = "inventory",
    summary = "Add an inventory item",
    request_body = InventoryItemCreate,
    responses(
        (status = 201, description = "Item created", body = InventoryItemResponse),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_item(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<InventoryItemResponse>)> {
    let request: InventoryItemCreate = validate_into(InventoryItemCreate::FIELDS, body)?;

    let item = InventoryItems::new(state.store.as_ref())
        .create(&InventoryItem::from(request))
        .await?;

    Ok((StatusCode::CREATED, Json(item.into())))
}

#[utoipa::path(
    get,
    path = "/inventory",
    tag = "inventory",
    summary = "List inventory items",
    responses(
        (status = 200, description = "All items, oldest first", body = Vec<InventoryItemResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<InventoryItemResponse>>> {
    let items = InventoryItems::new(state.store.as_ref()).list(&()).await?;
    Ok(Json(items.into_iter().map(InventoryItemResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/inventory/{id}",
    tag = "inventory",
    summary = "Get an inventory item",
    params(("id" = String, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item found", body = InventoryItemResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_item(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<InventoryItemResponse>> {
    let id = parse_id("item", &id)?;

    match InventoryItems::new(state.store.as_ref()).get_by_id(id).await? {
        Some(item) => Ok(Json(item.into())),
        None => Err(Error::NotFound {
            resource: "Item".to_string(),
            id: id.to_string(),
        }),
    }
}

#[utoipa::path(
    put,
    path = "/inventory/{id}",
    tag = "inventory",
    summary = "Replace an inventory item",
    params(("id" = String, Path, description = "Item ID")),
    request_body = InventoryItemUpdate,
    responses(
        (status = 200, description = "Item updated", body = InventoryItemResponse),
        (status = 400, description = "Malformed ID or fields, or nothing changed", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<InventoryItemResponse>> {
    let id = parse_id("item", &id)?;
    let request: InventoryItemUpdate = validate_into(InventoryItemUpdate::FIELDS, body)?;

    let item = InventoryItems::new(state.store.as_ref())
        .update(id, &InventoryItem::from(request))
        .await
        .map_err(not_found_as("Item", id))?;

    Ok(Json(item.into()))
}

#[utoipa::path(
    delete,
    path = "/inventory/{id}",
    tag = "inventory",
    summary = "Delete an inventory item",
    params(("id" = String, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item deleted", body = MessageResponse),
        (status = 400, description = "Malformed ID", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_item(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<MessageResponse>> {
    let id = parse_id("item", &id)?;

    if !InventoryItems::new(state.store.as_ref()).delete(id).await? {
        return Err(Error::NotFound {
            resource: "Item".to_string(),
            id: id.to_string(),
        });
    }

    Ok(Json(MessageResponse::new("Item deleted successfully")))
}

#[utoipa::path(
    get,
    path = "/inventory/report",
    tag = "inventory",
    summary = "Stock report",
    responses(
        (status = 200, description = "All items with totals", body = StockReport),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn stock_report(State(state): State<AppState>) -> Result<Json<StockReport>> {
    let items = InventoryItems::new(state.store.as_ref()).list(&()).await?;

    let total_quantity = items.iter().map(|item| u64::from(item.data.quantity)).sum();
    let total_value = items
        .iter()
        .try_fold(Decimal::ZERO, |total, item| {
            item.data.stock_value().and_then(|value| total.checked_add(value))
        })
        .ok_or_else(|| Error::Internal {
            operation: "compute total stock value: overflow".to_string(),
        })?;
    let out_of_stock = items
        .iter()
        .filter(|item| item.data.is_out_of_stock())
        .map(|item| item.data.item_name.clone())
        .collect();

    Ok(Json(StockReport {
        message: "Stock report generated".to_string(),
        total_items: items.len(),
        total_quantity,
        total_value,
        out_of_stock,
        items: items.into_iter().map(InventoryItemResponse::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/inventory/check-stock",
    tag = "inventory",
    summary = "Check stock and alert on empty items",
    description = "Queues one out-of-stock alert to the admin address per item with zero quantity.",
    responses(
        (status = 200, description = "Stock checked", body = StockCheckResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn check_stock(State(state): State<AppState>) -> Result<Json<StockCheckResponse>> {
    let items = InventoryItems::new(state.store.as_ref()).list(&()).await?;

    let out_of_stock: Vec<String> = items
        .into_iter()
        .filter(|item| item.data.is_out_of_stock())
        .map(|item| item.data.item_name)
        .collect();

    let notifications_queued = out_of_stock
        .iter()
        .map(|name| state.notifier.notify(Notification::OutOfStock { item_name: name.clone() }))
        .filter(|&queued| queued)
        .count();

    tracing::info!(out_of_stock = out_of_stock.len(), notifications_queued, "Stock checked");

    Ok(Json(StockCheckResponse {
        message: "Stock checked and notifications sent if needed".to_string(),
        out_of_stock,
        notifications_queued,
    }))
}
