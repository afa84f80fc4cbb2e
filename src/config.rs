use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub payment_api_base: String,
    pub payment_secret_key: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let payment_api_base = env::var("PAYMENT_API_BASE")
            .unwrap_or_else(|_| "https://api.stripe.com".to_string());
        // Missing key is only an error once a payment intent is requested.
        let payment_secret_key = env::var("STRIPE_SECRET_KEY").unwrap_or_default();
        Ok(Self {
            port,
            database_url,
            host,
            payment_api_base,
            payment_secret_key,
        })
    }
}
