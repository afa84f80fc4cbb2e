use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod cart;
pub mod categories;
pub mod doc;
pub mod health;
pub mod params;
pub mod payments;
pub mod products;
pub mod tags;
pub mod wishlists;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/tags", tags::router())
        .nest("/categories", categories::router())
        .nest("/cart", cart::router())
        .nest("/wishlists", wishlists::router())
        .nest("/payments", payments::router())
}
