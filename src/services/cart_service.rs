use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::cart::{AddCartItemRequest, CartDto, CartItemDto, UpdateCartItemRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Cart, CartItem, Product},
    response::{ApiResponse, Meta},
};

#[derive(FromRow)]
struct CartItemWithProductRow {
    item_id: Uuid,
    quantity: i32,
    product_id: Uuid,
    user_id: Uuid,
    name: String,
    description: String,
    price: i64,
    stock: i32,
    image_url: Option<String>,
    category_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

async fn find_cart(pool: &DbPool, user: &AuthUser) -> AppResult<Option<Cart>> {
    let cart = sqlx::query_as::<_, Cart>("SELECT * FROM carts WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_optional(pool)
        .await?;
    Ok(cart)
}

pub async fn get_cart(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<CartDto>> {
    let cart = match find_cart(pool, user).await? {
        Some(cart) => cart,
        None => return Err(AppError::NotFound),
    };

    let rows = sqlx::query_as::<_, CartItemWithProductRow>(
        r#"
        SELECT ci.id AS item_id, ci.quantity,
               p.id AS product_id, p.user_id, p.name, p.description, p.price,
               p.stock, p.image_url, p.category_id, p.created_at
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = $1
        ORDER BY ci.created_at DESC
        "#,
    )
    .bind(cart.id)
    .fetch_all(pool)
    .await?;

    let items = rows
        .into_iter()
        .map(|row| CartItemDto {
            id: row.item_id,
            product: Product {
                id: row.product_id,
                user_id: row.user_id,
                name: row.name,
                description: row.description,
                price: row.price,
                stock: row.stock,
                image_url: row.image_url,
                category_id: row.category_id,
                created_at: row.created_at,
            },
            quantity: row.quantity,
        })
        .collect();

    let data = CartDto {
        id: cart.id,
        items,
    };
    Ok(ApiResponse::success("Cart", data, None))
}

pub async fn create_cart(pool: &DbPool, user: &AuthUser) -> AppResult<ApiResponse<Cart>> {
    if find_cart(pool, user).await?.is_some() {
        return Err(AppError::BadRequest("Cart already exists".into()));
    }

    let cart =
        sqlx::query_as::<_, Cart>("INSERT INTO carts (id, user_id) VALUES ($1, $2) RETURNING *")
            .bind(Uuid::new_v4())
            .bind(user.user_id)
            .fetch_one(pool)
            .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_create",
        Some("carts"),
        Some(serde_json::json!({ "cart_id": cart.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Cart created",
        cart,
        Some(Meta::empty()),
    ))
}

pub async fn add_item(
    pool: &DbPool,
    user: &AuthUser,
    payload: AddCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let cart = match find_cart(pool, user).await? {
        Some(cart) => cart,
        None => return Err(AppError::BadRequest("cart not found".to_string())),
    };

    let product_exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(payload.product_id)
        .fetch_optional(pool)
        .await?;
    if product_exist.is_none() {
        return Err(AppError::BadRequest("product not found".to_string()));
    }

    // Re-adding a product replaces its quantity rather than accumulating.
    let exist: Option<CartItem> =
        sqlx::query_as("SELECT * FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart.id)
            .bind(payload.product_id)
            .fetch_optional(pool)
            .await?;

    let cart_item = if let Some(item) = exist {
        sqlx::query_as::<_, CartItem>(
            "UPDATE cart_items SET quantity = $2 WHERE id = $1 RETURNING *",
        )
        .bind(item.id)
        .bind(payload.quantity)
        .fetch_one(pool)
        .await?
    } else {
        sqlx::query_as::<_, CartItem>(
            r#"
            INSERT INTO cart_items (id, cart_id, product_id, quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(cart.id)
        .bind(payload.product_id)
        .bind(payload.quantity)
        .fetch_one(pool)
        .await?
    };

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_item_add",
        Some("cart_items"),
        Some(serde_json::json!({
            "product_id": payload.product_id,
            "quantity": payload.quantity,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("OK", cart_item, None))
}

pub async fn update_item(
    pool: &DbPool,
    user: &AuthUser,
    item_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let item = sqlx::query_as::<_, CartItem>(
        r#"
        UPDATE cart_items ci
        SET quantity = $3
        FROM carts c
        WHERE ci.id = $1 AND ci.cart_id = c.id AND c.user_id = $2
        RETURNING ci.*
        "#,
    )
    .bind(item_id)
    .bind(user.user_id)
    .bind(payload.quantity)
    .fetch_optional(pool)
    .await?;

    let item = match item {
        Some(item) => item,
        None => return Err(AppError::NotFound),
    };

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_item_update",
        Some("cart_items"),
        Some(serde_json::json!({ "item_id": item.id, "quantity": item.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Updated", item, None))
}

pub async fn remove_item(
    pool: &DbPool,
    user: &AuthUser,
    item_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query(
        r#"
        DELETE FROM cart_items ci
        USING carts c
        WHERE ci.id = $1 AND ci.cart_id = c.id AND c.user_id = $2
        "#,
    )
    .bind(item_id)
    .bind(user.user_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "cart_item_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "item_id": item_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
