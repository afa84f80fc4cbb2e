use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::Category,
    response::ApiResponse,
    routes::params::AssignedQuery,
    services::category_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/{id}",
            axum::routing::put(update_category).delete(delete_category),
        )
}

#[utoipa::path(
    get,
    path = "/api/categories",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("assigned_only" = Option<bool>, Query, description = "Only categories referenced by a product"),
    ),
    responses(
        (status = 200, description = "List the caller's categories", body = ApiResponse<CategoryList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AssignedQuery>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = category_service::list_categories(&state.pool, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Create category", body = ApiResponse<Category>),
        (status = 400, description = "Duplicate name"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::create_category(&state.pool, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Updated category", body = ApiResponse<Category>),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::update_category(&state.pool, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Deleted category"),
        (status = 404, description = "Category not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = category_service::delete_category(&state.pool, &user, id).await?;
    Ok(Json(resp))
}
