//! API request/response models for inventory items and stock reports.

use crate::db::models::inventory::InventoryItemDBResponse;
use crate::types::InventoryItemId;
use crate::validation::{FieldSpec, Format};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, PickFirst, serde_as};
use utoipa::ToSchema;

/// Request body for adding an inventory item, also used to fully replace one.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemCreate {
    #[schema(example = "Surgical gloves (box)")]
    pub item_name: String,
    /// Units in stock; zero marks the item out of stock
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[schema(value_type = u32, example = 25)]
    pub quantity: u32,
    /// Accepts a number or a decimal string; returned as a string
    #[schema(value_type = String, example = "12.50")]
    pub unit_price: Decimal,
    #[schema(example = "orders@medsupply.example.com")]
    pub supplier_email: String,
}

pub type InventoryItemUpdate = InventoryItemCreate;

/// Largest accepted unit price. Keeps every item's stock value representable.
pub const MAX_UNIT_PRICE: f64 = 1_000_000_000.0;

impl InventoryItemCreate {
    pub const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::truthy("itemName"),
        FieldSpec::present("quantity").with(&[Format::NonNegativeInteger]),
        FieldSpec::present("unitPrice").with(&[Format::NonNegativeNumber, Format::AtMost(MAX_UNIT_PRICE)]),
        FieldSpec::truthy("supplierEmail").with(&[Format::Email]),
    ];
}

/// A stored inventory item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: InventoryItemId,
    pub item_name: String,
    pub quantity: u32,
    #[schema(value_type = String, example = "12.50")]
    pub unit_price: Decimal,
    pub supplier_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<InventoryItemDBResponse> for InventoryItemResponse {
    fn from(db: InventoryItemDBResponse) -> Self {
        Self {
            id: db.id,
            item_name: db.data.item_name,
            quantity: db.data.quantity,
            unit_price: db.data.unit_price,
            supplier_email: db.data.supplier_email,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Whole-inventory stock report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockReport {
    #[schema(example = "Stock report generated")]
    pub message: String,
    pub items: Vec<InventoryItemResponse>,
    pub total_items: usize,
    pub total_quantity: u64,
    /// Sum of quantity times unit price
    #[schema(value_type = String, example = "1520.00")]
    pub total_value: Decimal,
    /// Names of items with zero quantity
    pub out_of_stock: Vec<String>,
}

/// Result of a stock check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockCheckResponse {
    #[schema(example = "Stock checked and notifications sent if needed")]
    pub message: String,
    pub out_of_stock: Vec<String>,
    /// Out-of-stock alerts accepted by the notification queue
    pub notifications_queued: usize,
}
