//! # Database Migrations
//!
//! Embedded SQL migrations for the Coinbox schema, run by
//! [`Database::new`](crate::Database::new) unless disabled in `DbConfig`.
//!
//! ## Schema
//! ```text
//! 001_initial_schema.sql
//!
//!   config                               storedfiles
//!   ┌──────────────────────────┐         ┌──────────────────────────────────┐
//!   │ section  TEXT   ┐ PK     │         │ id          INTEGER PK (autoinc) │
//!   │ key      TEXT   ┘        │         │ filename    TEXT  ≤ 255 chars    │
//!   │ value    TEXT  (JSON)    │         │ filetype    TEXT  ≤ 5 chars      │
//!   └──────────────────────────┘         │ content     BLOB  (read lazily)  │
//!     empty table ⇒ first run            │ created_at  TEXT  RFC 3339       │
//!     missing row ⇒ default value        │ updated_at  TEXT  RFC 3339       │
//!                                        └──────────────────────────────────┘
//!                                          idx_storedfiles_filename
//!                                          cache file: <cache_dir>/<id><filetype>
//! ```
//!
//! Applied versions are recorded by sqlx in `_sqlx_migrations`.
//!
//! ## Adding New Migrations
//!
//! 1. Create `migrations/sqlite/NNN_description.sql` with the next number
//! 2. Never edit a released migration; add a new one instead

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Embedded migrations from the `migrations/sqlite` directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations.
///
/// Idempotent: safe to run multiple times.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Returns `(total_migrations, applied_migrations)` for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied as usize))
}
