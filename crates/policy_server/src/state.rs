//! Shared request state: one SQLite connection and the date source.
//!
//! # Invariants
//! - Every service call holds the connection lock for its whole duration,
//!   so one request is one read-modify-write sequence.
//! - Blocking SQLite work never runs on the async executor threads.

use crate::error::ApiError;
use policy_core::{Clock, PolicyService, PolicyServiceError, SqlitePolicyRepository};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Policy service bound to the shared connection for one call.
pub type SharedPolicyService<'conn> = PolicyService<SqlitePolicyRepository<'conn>, Arc<dyn Clock>>;

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Wraps a migrated connection.
    pub fn new(conn: Connection, clock: Arc<dyn Clock>) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            clock,
        }
    }

    /// Runs `op` against a policy service on the blocking pool.
    pub async fn with_policies<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&SharedPolicyService<'_>) -> Result<T, PolicyServiceError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let clock = Arc::clone(&self.clock);

        tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| ApiError::Internal("policy store lock poisoned".to_string()))?;
            let repo = SqlitePolicyRepository::try_new(&conn).map_err(PolicyServiceError::from)?;
            let service = PolicyService::new(repo, clock);
            op(&service).map_err(ApiError::from)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("policy store task failed: {err}")))?
    }
}
