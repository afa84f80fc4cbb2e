use std::collections::HashMap;

use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::wishlists::{CreateWishlistRequest, UpdateWishlistRequest, WishlistDto, WishlistList},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Product, Wishlist},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

/// Replace a wishlist's product set. Every id must name an existing product.
async fn replace_wishlist_products(
    conn: &mut PgConnection,
    wishlist_id: Uuid,
    product_ids: &[Uuid],
) -> AppResult<()> {
    // The wishlist holds a set; repeated ids in the payload are collapsed
    // before the existence check so they cannot masquerade as unknown ids.
    let mut product_ids = product_ids.to_vec();
    product_ids.sort_unstable();
    product_ids.dedup();

    let known: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = ANY($1)")
        .bind(&product_ids)
        .fetch_all(&mut *conn)
        .await?;
    if known.len() != product_ids.len() {
        return Err(AppError::BadRequest("unknown product id".into()));
    }

    sqlx::query("DELETE FROM wishlist_products WHERE wishlist_id = $1")
        .bind(wishlist_id)
        .execute(&mut *conn)
        .await?;

    for product_id in &product_ids {
        sqlx::query(
            r#"
            INSERT INTO wishlist_products (wishlist_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(wishlist_id)
        .bind(product_id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[derive(FromRow)]
struct WishlistProductRow {
    wishlist_id: Uuid,
    #[sqlx(flatten)]
    product: Product,
}

async fn load_products(
    pool: &DbPool,
    wishlists: Vec<Wishlist>,
) -> AppResult<Vec<WishlistDto>> {
    let ids: Vec<Uuid> = wishlists.iter().map(|w| w.id).collect();
    let rows = sqlx::query_as::<_, WishlistProductRow>(
        r#"
        SELECT wp.wishlist_id, p.*
        FROM wishlist_products wp
        JOIN products p ON p.id = wp.product_id
        WHERE wp.wishlist_id = ANY($1)
        ORDER BY p.created_at DESC
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_wishlist: HashMap<Uuid, Vec<Product>> = HashMap::new();
    for row in rows {
        by_wishlist
            .entry(row.wishlist_id)
            .or_default()
            .push(row.product);
    }

    Ok(wishlists
        .into_iter()
        .map(|wishlist| WishlistDto {
            id: wishlist.id,
            products: by_wishlist.remove(&wishlist.id).unwrap_or_default(),
        })
        .collect())
}

pub async fn list_wishlists(
    pool: &DbPool,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<WishlistList>> {
    let (page, limit, offset) = pagination.normalize();
    let wishlists = sqlx::query_as::<_, Wishlist>(
        r#"
        SELECT * FROM wishlists
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM wishlists WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(pool)
        .await?;

    let items = load_products(pool, wishlists).await?;
    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Wishlists",
        WishlistList { items },
        Some(meta),
    ))
}

pub async fn get_wishlist(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<WishlistDto>> {
    let wishlist =
        sqlx::query_as::<_, Wishlist>("SELECT * FROM wishlists WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user.user_id)
            .fetch_optional(pool)
            .await?;
    let wishlist = match wishlist {
        Some(w) => w,
        None => return Err(AppError::NotFound),
    };

    let mut dtos = load_products(pool, vec![wishlist]).await?;
    let dto = dtos
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("wishlist loading lost the row")))?;
    Ok(ApiResponse::success("Wishlist", dto, None))
}

pub async fn create_wishlist(
    pool: &DbPool,
    user: &AuthUser,
    payload: CreateWishlistRequest,
) -> AppResult<ApiResponse<WishlistDto>> {
    let mut tx = pool.begin().await?;

    let wishlist = sqlx::query_as::<_, Wishlist>(
        "INSERT INTO wishlists (id, user_id) VALUES ($1, $2) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .fetch_one(&mut *tx)
    .await?;

    replace_wishlist_products(&mut tx, wishlist.id, &payload.product_ids).await?;

    tx.commit().await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "wishlist_create",
        Some("wishlists"),
        Some(serde_json::json!({ "wishlist_id": wishlist.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let mut dtos = load_products(pool, vec![wishlist]).await?;
    let dto = dtos
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("wishlist loading lost the row")))?;
    Ok(ApiResponse::success(
        "Wishlist created",
        dto,
        Some(Meta::empty()),
    ))
}

pub async fn update_wishlist(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateWishlistRequest,
) -> AppResult<ApiResponse<WishlistDto>> {
    let mut tx = pool.begin().await?;

    let wishlist =
        sqlx::query_as::<_, Wishlist>("SELECT * FROM wishlists WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user.user_id)
            .fetch_optional(&mut *tx)
            .await?;
    let wishlist = match wishlist {
        Some(w) => w,
        None => return Err(AppError::NotFound),
    };

    replace_wishlist_products(&mut tx, wishlist.id, &payload.product_ids).await?;

    tx.commit().await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "wishlist_update",
        Some("wishlists"),
        Some(serde_json::json!({ "wishlist_id": wishlist.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let mut dtos = load_products(pool, vec![wishlist]).await?;
    let dto = dtos
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("wishlist loading lost the row")))?;
    Ok(ApiResponse::success("Updated", dto, Some(Meta::empty())))
}

pub async fn delete_wishlist(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM wishlists WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user.user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "wishlist_delete",
        Some("wishlists"),
        Some(serde_json::json!({ "wishlist_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
