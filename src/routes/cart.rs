use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddCartItemRequest, CartDto, UpdateCartItemRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Cart, CartItem},
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).post(create_cart))
        .route("/items", post(add_item))
        .route("/items/{id}", put(update_item).delete(remove_item))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "The caller's cart with items", body = ApiResponse<CartDto>),
        (status = 404, description = "No cart yet"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<CartDto>>> {
    let resp = cart_service::get_cart(&state.pool, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart",
    responses(
        (status = 201, description = "Cart created", body = ApiResponse<Cart>),
        (status = 400, description = "Cart already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn create_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Cart>>> {
    let resp = cart_service::create_cart(&state.pool, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/items",
    request_body = AddCartItemRequest,
    responses(
        (status = 200, description = "Add or update cart item", body = ApiResponse<CartItem>),
        (status = 400, description = "Bad request"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_service::add_item(&state.pool, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/cart/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart item ID")
    ),
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Updated cart item", body = ApiResponse<CartItem>),
        (status = 404, description = "Cart item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn update_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_service::update_item(&state.pool, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Cart item ID")
    ),
    responses(
        (status = 200, description = "OK", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Cart item not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = cart_service::remove_item(&state.pool, &user, id).await?;
    Ok(Json(resp))
}
