use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Stripe-style payment intent client. Only intent creation is implemented;
/// webhook handling is the gateway's own integration surface.
#[derive(Clone)]
pub struct PaymentClient {
    http: reqwest::Client,
    api_base: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    error: GatewayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorDetail {
    message: String,
}

impl PaymentClient {
    pub fn new(api_base: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Create a payment intent for `amount` cents in USD, tagged with the
    /// requesting user's id so the gateway dashboard can attribute it.
    pub async fn create_intent(&self, amount: i64, user_id: Uuid) -> AppResult<PaymentIntent> {
        if self.secret_key.is_empty() {
            return Err(AppError::Internal(anyhow::anyhow!(
                "STRIPE_SECRET_KEY is not set"
            )));
        }

        let params = [
            ("amount", amount.to_string()),
            ("currency", "usd".to_string()),
            ("metadata[user_id]", user_id.to_string()),
        ];

        let response = self
            .http
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::Gateway(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<GatewayErrorBody>().await {
                Ok(body) => body.error.message,
                Err(_) => format!("gateway returned status {}", status.as_u16()),
            };
            return Err(AppError::Gateway(message));
        }

        let intent = response
            .json::<PaymentIntent>()
            .await
            .map_err(|e| AppError::Gateway(e.to_string()))?;
        Ok(intent)
    }
}
