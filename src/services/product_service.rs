use std::collections::HashMap;

use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::products::{
        CategoryInput, CreateProductRequest, ProductDetail, ProductList, TagInput,
        UpdateProductRequest,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Category, Product, Tag},
    response::{ApiResponse, Meta},
    routes::params::ProductQuery,
};

/// Tag and category names live in a global namespace: an insert that collides
/// re-reads the existing row (and keeps its original owner) instead of failing.
async fn get_or_create_tag(conn: &mut PgConnection, name: &str, user_id: Uuid) -> AppResult<Tag> {
    let tag = sqlx::query_as::<_, Tag>(
        r#"
        INSERT INTO tags (id, name, user_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    Ok(tag)
}

async fn get_or_create_category(
    conn: &mut PgConnection,
    name: &str,
    user_id: Uuid,
) -> AppResult<Category> {
    let category = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (id, name, user_id)
        VALUES ($1, $2, $3)
        ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(user_id)
    .fetch_one(conn)
    .await?;
    Ok(category)
}

async fn replace_product_tags(
    conn: &mut PgConnection,
    product_id: Uuid,
    user_id: Uuid,
    tags: &[TagInput],
) -> AppResult<Vec<Tag>> {
    sqlx::query("DELETE FROM product_tags WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

    let mut resolved = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = get_or_create_tag(&mut *conn, &tag.name, user_id).await?;
        sqlx::query(
            r#"
            INSERT INTO product_tags (product_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(product_id)
        .bind(tag.id)
        .execute(&mut *conn)
        .await?;
        resolved.push(tag);
    }
    Ok(resolved)
}

#[derive(FromRow)]
struct ProductTagRow {
    product_id: Uuid,
    id: Uuid,
    name: String,
    user_id: Uuid,
}

/// Batch-load tags and categories for a page of products.
async fn load_details(pool: &DbPool, products: Vec<Product>) -> AppResult<Vec<ProductDetail>> {
    let product_ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
    let category_ids: Vec<Uuid> = products.iter().filter_map(|p| p.category_id).collect();

    let tag_rows = sqlx::query_as::<_, ProductTagRow>(
        r#"
        SELECT pt.product_id, t.id, t.name, t.user_id
        FROM product_tags pt
        JOIN tags t ON t.id = pt.tag_id
        WHERE pt.product_id = ANY($1)
        ORDER BY t.name
        "#,
    )
    .bind(&product_ids)
    .fetch_all(pool)
    .await?;

    let mut tags_by_product: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    for row in tag_rows {
        tags_by_product.entry(row.product_id).or_default().push(Tag {
            id: row.id,
            name: row.name,
            user_id: row.user_id,
        });
    }

    let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ANY($1)")
        .bind(&category_ids)
        .fetch_all(pool)
        .await?;
    let categories_by_id: HashMap<Uuid, Category> =
        categories.into_iter().map(|c| (c.id, c)).collect();

    Ok(products
        .into_iter()
        .map(|product| {
            let tags = tags_by_product.remove(&product.id).unwrap_or_default();
            let category = product
                .category_id
                .and_then(|id| categories_by_id.get(&id).cloned());
            ProductDetail::from_parts(product, category, tags)
        })
        .collect())
}

pub async fn list_products(
    pool: &DbPool,
    user: &AuthUser,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let tag_ids = query.tag_ids()?;
    let category_ids = query.category_ids()?;

    let products = sqlx::query_as::<_, Product>(
        r#"
        SELECT p.* FROM products p
        WHERE p.user_id = $1
          AND ($2::uuid[] IS NULL
               OR p.id IN (SELECT product_id FROM product_tags WHERE tag_id = ANY($2)))
          AND ($3::uuid[] IS NULL OR p.category_id = ANY($3))
        ORDER BY p.created_at DESC, p.id DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(user.user_id)
    .bind(&tag_ids)
    .bind(&category_ids)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM products p
        WHERE p.user_id = $1
          AND ($2::uuid[] IS NULL
               OR p.id IN (SELECT product_id FROM product_tags WHERE tag_id = ANY($2)))
          AND ($3::uuid[] IS NULL OR p.category_id = ANY($3))
        "#,
    )
    .bind(user.user_id)
    .bind(&tag_ids)
    .bind(&category_ids)
    .fetch_one(pool)
    .await?;

    let items = load_details(pool, products).await?;
    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn get_product(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<ProductDetail>> {
    let product =
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user.user_id)
            .fetch_optional(pool)
            .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let mut details = load_details(pool, vec![product]).await?;
    let detail = details
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("detail loading lost the product")))?;
    Ok(ApiResponse::success("Product", detail, None))
}

pub async fn create_product(
    pool: &DbPool,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    if payload.price < 0 {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if payload.stock < 0 {
        return Err(AppError::BadRequest("stock must not be negative".into()));
    }

    let mut tx = pool.begin().await?;

    let category = match payload.category {
        Some(CategoryInput { name }) => {
            Some(get_or_create_category(&mut tx, &name, user.user_id).await?)
        }
        None => None,
    };

    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (id, user_id, name, description, price, stock, image_url, category_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.price)
    .bind(payload.stock)
    .bind(&payload.image_url)
    .bind(category.as_ref().map(|c| c.id))
    .fetch_one(&mut *tx)
    .await?;

    let tags = replace_product_tags(&mut tx, product.id, user.user_id, &payload.tags).await?;

    tx.commit().await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product created",
        ProductDetail::from_parts(product, category, tags),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    let mut tx = pool.begin().await?;

    let existing =
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user.user_id)
            .fetch_optional(&mut *tx)
            .await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    let name = payload.name.unwrap_or(existing.name);
    let description = payload.description.unwrap_or(existing.description);
    let price = payload.price.unwrap_or(existing.price);
    let stock = payload.stock.unwrap_or(existing.stock);
    let image_url = payload.image_url.or(existing.image_url);
    if price < 0 {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if stock < 0 {
        return Err(AppError::BadRequest("stock must not be negative".into()));
    }

    let category_id = match payload.category {
        Some(CategoryInput { name }) => {
            Some(get_or_create_category(&mut tx, &name, user.user_id).await?.id)
        }
        None => existing.category_id,
    };

    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET name = $3, description = $4, price = $5, stock = $6, image_url = $7, category_id = $8
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user.user_id)
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(stock)
    .bind(image_url)
    .bind(category_id)
    .fetch_one(&mut *tx)
    .await?;

    // A provided tag list replaces the set wholesale; absent means untouched.
    if let Some(tags) = payload.tags.as_deref() {
        replace_product_tags(&mut tx, product.id, user.user_id, tags).await?;
    }

    tx.commit().await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let mut details = load_details(pool, vec![product]).await?;
    let detail = details
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("detail loading lost the product")))?;
    Ok(ApiResponse::success("Updated", detail, Some(Meta::empty())))
}

pub async fn delete_product(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1 AND user_id = $2")
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
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
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
