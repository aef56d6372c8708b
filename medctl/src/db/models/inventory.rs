//! Database models for inventory items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Record;
use crate::api::models::inventory::InventoryItemCreate;

/// Stored body of an inventory item document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub item_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub supplier_email: String,
}

impl InventoryItem {
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }

    /// Quantity times unit price, `None` when the product does not fit a `Decimal`
    pub fn stock_value(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price)
    }
}

impl From<InventoryItemCreate> for InventoryItem {
    fn from(api: InventoryItemCreate) -> Self {
        Self {
            item_name: api.item_name.trim().to_string(),
            quantity: api.quantity,
            unit_price: api.unit_price,
            supplier_email: api.supplier_email,
        }
    }
}

pub type InventoryItemCreateDBRequest = InventoryItem;
pub type InventoryItemUpdateDBRequest = InventoryItem;
pub type InventoryItemDBResponse = Record<InventoryItem>;
