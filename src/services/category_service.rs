use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Category,
    response::{ApiResponse, Meta},
    routes::params::AssignedQuery,
};

pub async fn list_categories(
    pool: &DbPool,
    user: &AuthUser,
    query: AssignedQuery,
) -> AppResult<ApiResponse<CategoryList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let assigned_only = query.assigned_only.unwrap_or(false);

    let items = sqlx::query_as::<_, Category>(
        r#"
        SELECT c.* FROM categories c
        WHERE c.user_id = $1
          AND (NOT $2 OR EXISTS (SELECT 1 FROM products p WHERE p.category_id = c.id))
        ORDER BY c.name DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(user.user_id)
    .bind(assigned_only)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM categories c
        WHERE c.user_id = $1
          AND (NOT $2 OR EXISTS (SELECT 1 FROM products p WHERE p.category_id = c.id))
        "#,
    )
    .bind(user.user_id)
    .bind(assigned_only)
    .fetch_one(pool)
    .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(meta),
    ))
}

pub async fn create_category(
    pool: &DbPool,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE name = $1")
        .bind(payload.name.as_str())
        .fetch_optional(pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest(
            "Category name is already taken".into(),
        ));
    }

    let category = sqlx::query_as::<_, Category>(
        "INSERT INTO categories (id, name, user_id) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(payload.name.as_str())
    .bind(user.user_id)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "category_create",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Category created",
        category,
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }

    let clash: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM categories WHERE name = $1 AND id <> $2")
            .bind(payload.name.as_str())
            .bind(id)
            .fetch_optional(pool)
            .await?;
    if clash.is_some() {
        return Err(AppError::BadRequest(
            "Category name is already taken".into(),
        ));
    }

    let category = sqlx::query_as::<_, Category>(
        "UPDATE categories SET name = $3 WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(user.user_id)
    .bind(payload.name.as_str())
    .fetch_optional(pool)
    .await?;

    let category = match category {
        Some(category) => category,
        None => return Err(AppError::NotFound),
    };

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "category_update",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        category,
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    // Products referencing this category keep existing with a NULL category.
    let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
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
        "category_delete",
        Some("categories"),
        Some(serde_json::json!({ "category_id": id })),
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
