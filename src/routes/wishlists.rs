use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::wishlists::{CreateWishlistRequest, UpdateWishlistRequest, WishlistDto, WishlistList},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::Pagination,
    services::wishlist_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_wishlists).post(create_wishlist))
        .route(
            "/{id}",
            get(get_wishlist)
                .put(update_wishlist)
                .delete(delete_wishlist),
        )
}

#[utoipa::path(
    get,
    path = "/api/wishlists",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
    ),
    responses(
        (status = 200, description = "List the caller's wishlists", body = ApiResponse<WishlistList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlists"
)]
pub async fn list_wishlists(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<WishlistList>>> {
    let resp = wishlist_service::list_wishlists(&state.pool, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/wishlists",
    request_body = CreateWishlistRequest,
    responses(
        (status = 201, description = "Create wishlist", body = ApiResponse<WishlistDto>),
        (status = 400, description = "Unknown product id"),
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlists"
)]
pub async fn create_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateWishlistRequest>,
) -> AppResult<Json<ApiResponse<WishlistDto>>> {
    let resp = wishlist_service::create_wishlist(&state.pool, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/wishlists/{id}",
    params(
        ("id" = Uuid, Path, description = "Wishlist ID")
    ),
    responses(
        (status = 200, description = "Get wishlist", body = ApiResponse<WishlistDto>),
        (status = 404, description = "Wishlist not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlists"
)]
pub async fn get_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<WishlistDto>>> {
    let resp = wishlist_service::get_wishlist(&state.pool, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/wishlists/{id}",
    params(
        ("id" = Uuid, Path, description = "Wishlist ID")
    ),
    request_body = UpdateWishlistRequest,
    responses(
        (status = 200, description = "Updated wishlist", body = ApiResponse<WishlistDto>),
        (status = 404, description = "Wishlist not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlists"
)]
pub async fn update_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateWishlistRequest>,
) -> AppResult<Json<ApiResponse<WishlistDto>>> {
    let resp = wishlist_service::update_wishlist(&state.pool, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/wishlists/{id}",
    params(
        ("id" = Uuid, Path, description = "Wishlist ID")
    ),
    responses(
        (status = 200, description = "Deleted wishlist"),
        (status = 404, description = "Wishlist not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Wishlists"
)]
pub async fn delete_wishlist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = wishlist_service::delete_wishlist(&state.pool, &user, id).await?;
    Ok(Json(resp))
}
