use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DbConfig;

/// Failure modes shared by the repositories.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("no matching row")]
    NotFound,

    #[error("unique constraint violated")]
    Duplicate,

    #[error("storage error: {0}")]
    Storage(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::Duplicate,
            _ => RepoError::Storage(err),
        }
    }
}

/// Opens the pool and proves the database answers before the server binds.
pub async fn connect(cfg: &DbConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(cfg.acquire_timeout())
        .connect_with(cfg.connect_options()?)
        .await
        .context("connect to database")?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("ping database")?;

    info!(max_connections = cfg.max_connections, "database connected");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_becomes_not_found() {
        assert!(matches!(
            RepoError::from(sqlx::Error::RowNotFound),
            RepoError::NotFound
        ));
    }

    #[test]
    fn other_errors_are_storage() {
        assert!(matches!(
            RepoError::from(sqlx::Error::PoolTimedOut),
            RepoError::Storage(_)
        ));
    }
}
