use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::tags::{CreateTagRequest, TagList, UpdateTagRequest},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Tag,
    response::{ApiResponse, Meta},
    routes::params::AssignedQuery,
};

pub async fn list_tags(
    pool: &DbPool,
    user: &AuthUser,
    query: AssignedQuery,
) -> AppResult<ApiResponse<TagList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let assigned_only = query.assigned_only.unwrap_or(false);

    let items = sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.* FROM tags t
        WHERE t.user_id = $1
          AND (NOT $2 OR EXISTS (SELECT 1 FROM product_tags pt WHERE pt.tag_id = t.id))
        ORDER BY t.name DESC
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
        SELECT COUNT(*) FROM tags t
        WHERE t.user_id = $1
          AND (NOT $2 OR EXISTS (SELECT 1 FROM product_tags pt WHERE pt.tag_id = t.id))
        "#,
    )
    .bind(user.user_id)
    .bind(assigned_only)
    .fetch_one(pool)
    .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success("Tags", TagList { items }, Some(meta)))
}

pub async fn create_tag(
    pool: &DbPool,
    user: &AuthUser,
    payload: CreateTagRequest,
) -> AppResult<ApiResponse<Tag>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }

    let exist: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM tags WHERE name = $1")
        .bind(payload.name.as_str())
        .fetch_optional(pool)
        .await?;
    if exist.is_some() {
        return Err(AppError::BadRequest("Tag name is already taken".into()));
    }

    let tag = sqlx::query_as::<_, Tag>(
        "INSERT INTO tags (id, name, user_id) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(payload.name.as_str())
    .bind(user.user_id)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "tag_create",
        Some("tags"),
        Some(serde_json::json!({ "tag_id": tag.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Tag created",
        tag,
        Some(Meta::empty()),
    ))
}

pub async fn update_tag(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateTagRequest,
) -> AppResult<ApiResponse<Tag>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }

    // Renaming onto a name held by another tag violates the global namespace.
    let clash: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM tags WHERE name = $1 AND id <> $2")
        .bind(payload.name.as_str())
        .bind(id)
        .fetch_optional(pool)
        .await?;
    if clash.is_some() {
        return Err(AppError::BadRequest("Tag name is already taken".into()));
    }

    let tag = sqlx::query_as::<_, Tag>(
        "UPDATE tags SET name = $3 WHERE id = $1 AND user_id = $2 RETURNING *",
    )
    .bind(id)
    .bind(user.user_id)
    .bind(payload.name.as_str())
    .fetch_optional(pool)
    .await?;

    let tag = match tag {
        Some(tag) => tag,
        None => return Err(AppError::NotFound),
    };

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "tag_update",
        Some("tags"),
        Some(serde_json::json!({ "tag_id": tag.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("Updated", tag, Some(Meta::empty())))
}

pub async fn delete_tag(
    pool: &DbPool,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND user_id = $2")
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
        "tag_delete",
        Some("tags"),
        Some(serde_json::json!({ "tag_id": id })),
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
