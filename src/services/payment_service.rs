use crate::{
    audit::log_audit,
    dto::payments::{CreatePaymentIntentRequest, PaymentIntentResponse},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::ApiResponse,
    state::AppState,
};

pub async fn create_payment_intent(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePaymentIntentRequest,
) -> AppResult<ApiResponse<PaymentIntentResponse>> {
    if payload.amount <= 0 {
        return Err(AppError::BadRequest(
            "amount must be greater than 0".to_string(),
        ));
    }

    let intent = state
        .payments
        .create_intent(payload.amount, user.user_id)
        .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "payment_intent_create",
        Some("payments"),
        Some(serde_json::json!({ "intent_id": intent.id, "amount": payload.amount })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Payment intent created",
        PaymentIntentResponse {
            client_secret: intent.client_secret,
        },
        None,
    ))
}
