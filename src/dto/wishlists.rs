use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateWishlistRequest {
    #[serde(default)]
    pub product_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateWishlistRequest {
    /// Full replacement of the wishlist's product set.
    pub product_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistDto {
    pub id: Uuid,
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistList {
    pub items: Vec<WishlistDto>,
}
