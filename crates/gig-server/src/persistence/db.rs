//! Database connection and initialization.

use anyhow::Result;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::{info, warn};

/// Database connection wrapper.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Years whose RFC 3339 rendering is exactly four digits.
pub const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Fixed-width UTC timestamp so that text comparison in SQL orders correctly.
///
/// Only fixed-width for instants inside [`STORABLE_YEARS`]; see [`is_storable`].
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn is_storable(ts: DateTime<Utc>) -> bool {
    STORABLE_YEARS.contains(&ts.year())
}

/// Like [`format_timestamp`], but pins instants outside [`STORABLE_YEARS`] to
/// the nearest storable bound so range predicates keep their ordering.
pub fn format_range_bound(ts: DateTime<Utc>) -> String {
    if ts.year() < *STORABLE_YEARS.start() {
        "0000-01-01T00:00:00.000Z".to_string()
    } else if ts.year() > *STORABLE_YEARS.end() {
        "9999-12-31T23:59:59.999Z".to_string()
    } else {
        format_timestamp(ts)
    }
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

/// Initialize the SQLite database.
///
/// Creates the database file if it doesn't exist, runs migrations,
/// and returns a connection pool.
pub async fn init_database(db_path: &str, max_connections: u32) -> Result<Database> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path);

    info!("Connecting to database: {}", db_path);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(&db_url)
        .await?;

    run_migrations(&pool).await?;

    Ok(Database { pool })
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let migration_sql = include_str!("../../migrations/001_init.sql");

    info!("Running database migrations...");

    for statement in migration_sql.split(';') {
        // Remove comment lines and trim whitespace
        let statement: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");
        let statement = statement.trim();
        if statement.is_empty() {
            continue;
        }

        if let Err(e) = sqlx::query(statement).execute(pool).await {
            let err_str = e.to_string();
            // "already exists" is expected on re-runs
            if err_str.contains("already exists") {
                continue;
            }
            if statement.to_uppercase().starts_with("CREATE") {
                anyhow::bail!("Migration failed on CREATE statement: {}", e);
            }
            warn!("Migration statement failed: {}", e);
        }
    }

    info!("Database migrations complete");
    Ok(())
}
