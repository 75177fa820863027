//! Read-only access to the review store

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;

/// Connect to the review store in read-only mode
///
/// The database is created and written by bankrev-ai; this service never
/// writes to it.
pub async fn connect_readonly(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        anyhow::bail!(
            "Database not found: {}\nStart bankrev-ai first to initialize the database.",
            db_path.display()
        );
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .read_only(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("Failed to connect to database in read-only mode")?;

    // A write must fail on this connection
    let write_test = sqlx::query("CREATE TABLE _bankrev_write_probe (id INTEGER)")
        .execute(&pool)
        .await;
    if write_test.is_ok() {
        anyhow::bail!("Database connection is not read-only: {}", db_path.display());
    }

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankrev_common::db::init_database;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_database_is_error() {
        let dir = TempDir::new().unwrap();
        let err = connect_readonly(&dir.path().join("absent.db")).await.unwrap_err();
        assert!(err.to_string().contains("Database not found"));
    }

    #[tokio::test]
    async fn test_connection_rejects_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bankrev.db");
        let _writer = init_database(&path).await.unwrap();

        let pool = connect_readonly(&path).await.unwrap();

        let topics: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM topics")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(topics, 0);
        assert!(sqlx::query("INSERT INTO topics (name) VALUES ('x')")
            .execute(&pool)
            .await
            .is_err());
    }
}
