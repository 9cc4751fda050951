//! Application state management.
//!
//! Defines the AppState struct that holds all shared application state:
//! the storage backend, session store, token revocation set, and the clients
//! for the external identity, billing, and object-store services.

use std::sync::Arc;

use sqlx::PgPool;

use crate::routes::auth::{RevokedTokens, SessionStore, new_revoked_tokens, new_session_store};
use crate::services::billing_service::BillingService;
use crate::services::identity_service::IdentityService;
use crate::services::jwt_service::{JwtService, SharedJwtService};
use crate::services::signed_url_service::SignedUrlService;
use crate::storage::{MemoryStorageBackend, PostgresStorageBackend, StorageBackend, StorageError};

/// Application state shared across all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend (PostgreSQL in production, in-memory otherwise)
    pub storage: Arc<dyn StorageBackend>,
    /// Session store for authentication
    pub session_store: SessionStore,
    /// Sessions revoked before token expiry (logout)
    pub revoked_tokens: RevokedTokens,
    /// JWT signing/validation
    pub jwt_service: SharedJwtService,
    /// Hosted identity provider client
    pub identity_service: Arc<IdentityService>,
    /// Payments provider client
    pub billing_service: Arc<BillingService>,
    /// Object store signed-URL client
    pub signed_url_service: Arc<SignedUrlService>,
    /// PostgreSQL connection pool (present when DATABASE_URL is set)
    pub database: Option<PgPool>,
}

impl AppState {
    /// Create application state from environment configuration with the
    /// in-memory storage backend.
    pub fn new() -> Self {
        Self::with_backend(
            Arc::new(MemoryStorageBackend::new()),
            Arc::new(JwtService::from_env()),
        )
    }

    /// Create application state around an explicit storage backend and JWT
    /// service. Used by tests to avoid environment coupling.
    pub fn with_backend(storage: Arc<dyn StorageBackend>, jwt_service: SharedJwtService) -> Self {
        Self {
            storage,
            session_store: new_session_store(),
            revoked_tokens: new_revoked_tokens(),
            jwt_service,
            identity_service: Arc::new(IdentityService::from_env()),
            billing_service: Arc::new(BillingService::from_env()),
            signed_url_service: Arc::new(SignedUrlService::from_env()),
            database: None,
        }
    }

    /// Initialize storage backend from environment configuration.
    ///
    /// Connects to PostgreSQL and runs migrations if DATABASE_URL is set,
    /// otherwise keeps the in-memory backend.
    pub async fn init_storage(&mut self) -> Result<(), StorageError> {
        if let Ok(database_url) = std::env::var("DATABASE_URL") {
            match sqlx::PgPool::connect(&database_url).await {
                Ok(pool) => {
                    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
                        return Err(StorageError::ConnectionError(format!(
                            "Migration failed: {}",
                            e
                        )));
                    }

                    self.database = Some(pool.clone());
                    self.storage = Arc::new(PostgresStorageBackend::new(pool));
                    Ok(())
                }
                Err(e) => Err(StorageError::ConnectionError(format!(
                    "Failed to connect to database: {}",
                    e
                ))),
            }
        } else {
            // In-memory storage (no database)
            Ok(())
        }
    }

    /// Check if PostgreSQL storage is enabled
    pub fn is_postgres(&self) -> bool {
        self.database.is_some()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
