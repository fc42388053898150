use sqlx::PgPool;
use std::sync::Arc;

use crate::services::{auth::AuthService, storage::ImageStore};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub storage: Arc<ImageStore>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(db: PgPool, storage: ImageStore, auth: AuthService) -> Self {
        Self {
            db,
            storage: Arc::new(storage),
            auth: Arc::new(auth),
        }
    }
}
