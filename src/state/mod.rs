use std::sync::Arc;
use std::time::Instant;

use sea_orm::DatabaseConnection;

use crate::auth::TokenSigner;

#[derive(Clone)]
pub struct AppState {
    pub database: DatabaseConnection,
    pub tokens: Arc<TokenSigner>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(database: DatabaseConnection, tokens: TokenSigner) -> Self {
        Self {
            database,
            tokens: Arc::new(tokens),
            start_time: Instant::now(),
        }
    }
}
