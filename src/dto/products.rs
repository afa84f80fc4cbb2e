use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Category, Product, Tag};

/// Nested tag payload; tags are resolved get-or-create by name.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TagInput {
    pub name: String,
}

/// Nested category payload; resolved get-or-create by name.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CategoryInput {
    pub name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price: i64,
    pub stock: i32,
    pub image_url: Option<String>,
    pub category: Option<CategoryInput>,
    #[serde(default)]
    pub tags: Vec<TagInput>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i32>,
    pub image_url: Option<String>,
    pub category: Option<CategoryInput>,
    /// When present, the product's tag set is cleared and rebuilt.
    pub tags: Option<Vec<TagInput>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub stock: i32,
    pub image_url: Option<String>,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
    pub created_at: DateTime<Utc>,
}

impl ProductDetail {
    pub fn from_parts(product: Product, category: Option<Category>, tags: Vec<Tag>) -> Self {
        Self {
            id: product.id,
            user_id: product.user_id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            image_url: product.image_url,
            category,
            tags,
            created_at: product.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<ProductDetail>,
}
