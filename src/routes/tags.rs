use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::tags::{CreateTagRequest, TagList, UpdateTagRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Tag,
    response::ApiResponse,
    routes::params::AssignedQuery,
    services::tag_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tags).post(create_tag))
        .route("/{id}", axum::routing::put(update_tag).delete(delete_tag))
}

#[utoipa::path(
    get,
    path = "/api/tags",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("assigned_only" = Option<bool>, Query, description = "Only tags attached to a product"),
    ),
    responses(
        (status = 200, description = "List the caller's tags", body = ApiResponse<TagList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Tags"
)]
pub async fn list_tags(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AssignedQuery>,
) -> AppResult<Json<ApiResponse<TagList>>> {
    let resp = tag_service::list_tags(&state.pool, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/tags",
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Create tag", body = ApiResponse<Tag>),
        (status = 400, description = "Duplicate name"),
    ),
    security(("bearer_auth" = [])),
    tag = "Tags"
)]
pub async fn create_tag(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTagRequest>,
) -> AppResult<Json<ApiResponse<Tag>>> {
    let resp = tag_service::create_tag(&state.pool, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/tags/{id}",
    params(
        ("id" = Uuid, Path, description = "Tag ID")
    ),
    request_body = UpdateTagRequest,
    responses(
        (status = 200, description = "Updated tag", body = ApiResponse<Tag>),
        (status = 404, description = "Tag not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Tags"
)]
pub async fn update_tag(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTagRequest>,
) -> AppResult<Json<ApiResponse<Tag>>> {
    let resp = tag_service::update_tag(&state.pool, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/tags/{id}",
    params(
        ("id" = Uuid, Path, description = "Tag ID")
    ),
    responses(
        (status = 200, description = "Deleted tag"),
        (status = 404, description = "Tag not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Tags"
)]
pub async fn delete_tag(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = tag_service::delete_tag(&state.pool, &user, id).await?;
    Ok(Json(resp))
}
