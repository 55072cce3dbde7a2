//! Shared state for the API layer.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::api::error::ApiError;
use crate::auth::token::TokenCodec;
use crate::config::{AppConfig, RoutingTopology};

/// Shared context for all routes and middleware: the database handle,
/// the token codec, and the referral routing topology.
///
/// SQLite access is serialized through a mutex; every operation is a
/// self-contained statement, so the guard is never held across an await.
#[derive(Clone)]
pub struct ApiContext {
    db: Arc<Mutex<Connection>>,
    pub codec: Arc<TokenCodec>,
    pub topology: Arc<RoutingTopology>,
}

impl ApiContext {
    pub fn new(conn: Connection, config: &AppConfig) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            codec: Arc::new(TokenCodec::new(&config.jwt_secret, config.token_ttl)),
            topology: Arc::new(config.routing.clone()),
        }
    }

    pub fn db(&self) -> Result<MutexGuard<'_, Connection>, ApiError> {
        self.db
            .lock()
            .map_err(|_| ApiError::Internal("database lock poisoned".into()))
    }
}
