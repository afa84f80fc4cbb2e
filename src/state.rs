use crate::{db::DbPool, payments::PaymentClient};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub payments: PaymentClient,
}
