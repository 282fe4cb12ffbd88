//! # Config Repository
//!
//! Persists the in-memory [`Config`] store in the `config` table.
//!
//! ```text
//! startup:   SELECT section, key, value ──► Config::load_entries
//!                                            (empty table ⇒ first run)
//!
//! save:      Config::pending_changes ──► one transaction
//!              Some(value) ⇒ INSERT .. ON CONFLICT DO UPDATE
//!              None        ⇒ DELETE
//!            commit ⇒ Config::mark_changes_saved (the written ones only)
//! ```

use coinbox_core::config::{Config, ConfigChange, ConfigHandle};
use serde_json::Value;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

/// Repository for the `config` table.
#[derive(Debug, Clone)]
pub struct ConfigRepository {
    pool: SqlitePool,
}

impl ConfigRepository {
    /// Creates a new ConfigRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ConfigRepository { pool }
    }

    /// Reads every stored entry as `(section, key, value)`.
    pub async fn load(&self) -> DbResult<Vec<(String, String, Value)>> {
        let rows = sqlx::query("SELECT section, key, value FROM config ORDER BY section, key")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                let section: String = row.try_get("section")?;
                let key: String = row.try_get("key")?;
                let raw: String = row.try_get("value")?;
                let value = serde_json::from_str(&raw)?;
                Ok((section, key, value))
            })
            .collect()
    }

    /// Loads the stored entries into a config.
    pub async fn load_into(&self, handle: &ConfigHandle) -> DbResult<()> {
        let entries = self.load().await?;
        let count = entries.len();
        handle.write(|c: &mut Config| c.load_entries(entries));
        info!(entries = count, "Config loaded");
        Ok(())
    }

    /// Writes changes in one transaction.
    pub async fn save(&self, changes: &[ConfigChange]) -> DbResult<()> {
        if changes.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for change in changes {
            match &change.value {
                Some(value) => {
                    sqlx::query(
                        r#"
                        INSERT INTO config (section, key, value)
                        VALUES (?1, ?2, ?3)
                        ON CONFLICT (section, key) DO UPDATE SET value = excluded.value
                        "#,
                    )
                    .bind(&change.section)
                    .bind(&change.key)
                    .bind(serde_json::to_string(value)?)
                    .execute(&mut *tx)
                    .await?;
                }
                None => {
                    sqlx::query("DELETE FROM config WHERE section = ?1 AND key = ?2")
                        .bind(&change.section)
                        .bind(&change.key)
                        .execute(&mut *tx)
                        .await?;
                }
            }
            debug!(section = %change.section, key = %change.key, "Config entry written");
        }
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(changes = changes.len(), "Config saved");
        Ok(())
    }

    /// Saves a config's pending changes and marks them saved.
    ///
    /// Changes made while the write is in flight stay pending.
    pub async fn save_from(&self, handle: &ConfigHandle) -> DbResult<()> {
        let changes = handle.read(Config::pending_changes);
        self.save(&changes).await?;
        handle.write(|c| c.mark_changes_saved(&changes));
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use serde_json::json;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_empty_table_is_first_run() {
        let db = setup().await;
        let handle = ConfigHandle::default();

        db.config().load_into(&handle).await.unwrap();
        assert!(handle.read(Config::is_first_run));
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let db = setup().await;
        let handle = ConfigHandle::default();

        handle.write(|c| {
            c.set("app", "fullscreen", true);
            c.set("printing", "f.receipt", -1);
            c.set("locale", "languages", json!(["en-US", "fr"]));
        });
        db.config().save_from(&handle).await.unwrap();
        assert!(!handle.read(Config::has_pending_changes));

        let reloaded = ConfigHandle::default();
        db.config().load_into(&reloaded).await.unwrap();

        reloaded.read(|c| {
            assert!(!c.is_first_run());
            assert!(c.fullscreen());
            assert_eq!(c.get_i64("printing", "f.receipt"), Some(-1));
            assert_eq!(c.locale_settings().languages, vec!["en-US", "fr"]);
        });
    }

    #[tokio::test]
    async fn test_save_then_rewrite_stays_pending() {
        let db = setup().await;
        let repo = db.config();
        let handle = ConfigHandle::default();
        handle.write(|c| c.set("app", "fullscreen", true));

        let written = handle.read(Config::pending_changes);
        repo.save(&written).await.unwrap();
        handle.write(|c| {
            c.set("app", "fullscreen", false);
            c.mark_changes_saved(&written);
        });
        assert!(handle.read(Config::has_pending_changes));

        repo.save_from(&handle).await.unwrap();
        let reloaded = ConfigHandle::default();
        repo.load_into(&reloaded).await.unwrap();
        assert!(!reloaded.read(Config::fullscreen));
    }

    #[tokio::test]
    async fn test_removal_deletes_row() {
        let db = setup().await;
        let handle = ConfigHandle::default();

        handle.write(|c| c.set("printing", "p.kitchen", json!({"name": "k"})));
        db.config().save_from(&handle).await.unwrap();

        handle.write(|c| c.remove("printing", "p.kitchen"));
        db.config().save_from(&handle).await.unwrap();

        assert!(db.config().load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_overwrites() {
        let db = setup().await;
        let repo = db.config();
        let change = |v: i64| ConfigChange {
            section: "menu".to_string(),
            key: "toolbar_style".to_string(),
            value: Some(json!(v)),
        };

        repo.save(&[change(1)]).await.unwrap();
        repo.save(&[change(3)]).await.unwrap();

        let entries = repo.load().await.unwrap();
        assert_eq!(
            entries,
            vec![("menu".to_string(), "toolbar_style".to_string(), json!(3))]
        );
    }
}
