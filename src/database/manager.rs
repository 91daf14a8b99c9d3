use std::sync::Arc;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::config;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection failed after {0} attempts")]
    RetriesExhausted(u32),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Holds the shared connection pool, created lazily on first use with the
/// bounded retry/backoff the deployment environment expects (the database
/// container may come up after the API does).
pub struct DatabaseManager {
    pool: Arc<RwLock<Option<PgPool>>>,
}

impl DatabaseManager {
    fn instance() -> &'static DatabaseManager {
        use std::sync::OnceLock;
        static INSTANCE: OnceLock<DatabaseManager> = OnceLock::new();
        INSTANCE.get_or_init(|| DatabaseManager {
            pool: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the shared pool, connecting (with retries) if necessary.
    pub async fn pool() -> Result<PgPool, DatabaseError> {
        let manager = Self::instance();

        // Fast path: try read lock
        {
            let pool = manager.pool.read().await;
            if let Some(pool) = pool.as_ref() {
                return Ok(pool.clone());
            }
        }

        let mut slot = manager.pool.write().await;
        // Another task may have connected while we waited for the lock
        if let Some(pool) = slot.as_ref() {
            return Ok(pool.clone());
        }

        let pool = Self::connect_with_retry().await?;
        *slot = Some(pool.clone());
        Ok(pool)
    }

    async fn connect_with_retry() -> Result<PgPool, DatabaseError> {
        let cfg = &config().database;
        let connection_string = Self::connection_string();

        for attempt in 1..=cfg.max_retries {
            let result = PgPoolOptions::new()
                .max_connections(cfg.max_connections)
                .acquire_timeout(Duration::from_secs(cfg.connection_timeout_secs))
                .connect(&connection_string)
                .await;

            match result {
                Ok(pool) => {
                    info!(attempt, "connected to database");
                    return Ok(pool);
                }
                Err(e) => {
                    warn!(
                        attempt,
                        max_retries = cfg.max_retries,
                        error = %e,
                        "database connection failed"
                    );
                    tokio::time::sleep(Duration::from_secs(cfg.retry_interval_secs)).await;
                }
            }
        }

        Err(DatabaseError::RetriesExhausted(cfg.max_retries))
    }

    /// `DATABASE_URL` wins; otherwise the string is assembled from the
    /// per-part env vars with local-development defaults.
    fn connection_string() -> String {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            return url;
        }

        let host = env_or("DB_HOST", "localhost");
        let port = env_or("DB_PORT", "5432");
        let user = env_or("DB_USER", "postgres");
        let password = env_or("DB_PASSWORD", "postgres");
        let name = env_or("DB_NAME", "orgdir");

        format!("postgres://{}:{}@{}:{}/{}", user, password, host, port, name)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check() -> Result<(), DatabaseError> {
        let pool = Self::pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close() {
        let manager = Self::instance();
        let mut slot = manager.pool.write().await;
        if let Some(pool) = slot.take() {
            pool.close().await;
            info!("closed database pool");
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test so the env mutations cannot race a parallel test runner.
    #[test]
    fn connection_string_sources() {
        std::env::set_var("DATABASE_URL", "postgres://u:p@db:5432/custom");
        assert_eq!(
            DatabaseManager::connection_string(),
            "postgres://u:p@db:5432/custom"
        );

        std::env::remove_var("DATABASE_URL");
        std::env::set_var("DB_HOST", "db.internal");
        std::env::set_var("DB_NAME", "orgdir_test");
        let s = DatabaseManager::connection_string();
        assert!(s.starts_with("postgres://"));
        assert!(s.contains("@db.internal:"));
        assert!(s.ends_with("/orgdir_test"));
        std::env::remove_var("DB_HOST");
        std::env::remove_var("DB_NAME");
    }
}
