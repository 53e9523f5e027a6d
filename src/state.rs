use sea_orm::DatabaseConnection;

use crate::config::CheckoutConfig;

#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub checkout: CheckoutConfig,
}
