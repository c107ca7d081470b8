//! Food Item Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Menu item available on the order form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub category: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// Upsert override payload (`PUT /api/food-items/{id}`)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FoodItemUpsert {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    pub available: Option<bool>,
}

impl FoodItemUpsert {
    pub fn into_item(self, id: impl Into<String>) -> FoodItem {
        FoodItem {
            id: id.into(),
            name: self.name,
            description: self.description,
            price: self.price,
            category: self.category,
            available: self.available.unwrap_or(true),
        }
    }
}
