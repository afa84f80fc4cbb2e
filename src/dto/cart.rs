use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemDto {
    pub id: Uuid,
    pub product: Product,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartDto {
    pub id: Uuid,
    pub items: Vec<CartItemDto>,
}
