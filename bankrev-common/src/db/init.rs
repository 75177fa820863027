//! Database initialization
//!
//! Tables are created idempotently on startup; there is no migration
//! machinery.

use crate::taxonomy::Taxonomy;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Open (creating if needed) the database file and ensure the schema exists
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // WAL lets the analytics service read while ingest writes.
    // Foreign keys are enabled per connection by SqliteConnectOptions.
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_reviews_table(pool).await?;
    create_topics_table(pool).await?;
    create_reviews_topics_table(pool).await?;
    Ok(())
}

async fn create_reviews_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            id INTEGER PRIMARY KEY,
            site_specific_id INTEGER,
            source TEXT,
            date TEXT,
            review_text TEXT,
            rating REAL,
            source_topic TEXT,
            source_subtopic TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_source ON reviews(source)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_date ON reviews(date)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_topics_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS topics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_reviews_topics_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews_topics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            review_id INTEGER NOT NULL REFERENCES reviews(id) ON DELETE CASCADE,
            topic_id INTEGER NOT NULL REFERENCES topics(id),
            sentiment TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_reviews_topics_review ON reviews_topics(review_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_reviews_topics_topic ON reviews_topics(topic_id)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_reviews_topics_sentiment ON reviews_topics(sentiment)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert every taxonomy name into `topics`; returns the number of new rows
pub async fn seed_topics(pool: &SqlitePool, taxonomy: &Taxonomy) -> Result<u64> {
    let mut inserted = 0;
    for name in taxonomy.all_names() {
        let result = sqlx::query("INSERT INTO topics (name) VALUES (?) ON CONFLICT(name) DO NOTHING")
            .bind(name)
            .execute(pool)
            .await?;
        inserted += result.rows_affected();
    }

    if inserted > 0 {
        info!(inserted, "Seeded topics table from taxonomy");
    }
    Ok(inserted)
}
