use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::payments::{CreatePaymentIntentRequest, PaymentIntentResponse},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::payment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/intent", post(create_intent))
}

#[utoipa::path(
    post,
    path = "/api/payments/intent",
    request_body = CreatePaymentIntentRequest,
    responses(
        (status = 200, description = "Payment intent created", body = ApiResponse<PaymentIntentResponse>),
        (status = 400, description = "Invalid amount or gateway rejection"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn create_intent(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePaymentIntentRequest>,
) -> AppResult<Json<ApiResponse<PaymentIntentResponse>>> {
    let resp = payment_service::create_payment_intent(&state, &user, payload).await?;
    Ok(Json(resp))
}
