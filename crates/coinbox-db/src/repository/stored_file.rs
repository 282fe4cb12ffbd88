//! # Stored File Repository
//!
//! Binary assets (logos, product pictures) kept in the `storedfiles` table.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Stored File Lifecycle                             │
//! │                                                                         │
//! │  NewStoredFile::from_path("logo.png")   ─┐                             │
//! │  NewStoredFile::from_bytes("a.txt", ..)  ├──► create() ──► StoredFile  │
//! │  NewStoredFile::image(path, size, fmt)  ─┘                  (no blob)  │
//! │                                                                 │       │
//! │                  ┌──────────────────────────────────────────────┤       │
//! │                  ▼                                              ▼       │
//! │         materialize(&file)                          update() / delete() │
//! │   <cache_dir>/<id><filetype> exists? ──yes──► path                     │
//! │                  │ no                                                   │
//! │                  ▼                                                      │
//! │        SELECT content, write file ──► path                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The content column is only read by [`StoredFileRepository::content`] and
//! [`StoredFileRepository::materialize`]. A cached file is never refreshed:
//! once written it stays until the cache directory is cleared.

use std::fmt::Display;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use image::{imageops, DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage};
use serde::Serialize;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, error, info, warn};

use coinbox_core::validation::{validate_filename, validate_filetype};

use crate::error::{DbError, DbResult};

/// Message shown when an image source cannot be decoded.
pub const INVALID_IMAGE: &str = "Invalid image file";

/// Message shown when a source file cannot be read.
pub const UNREADABLE_FILE: &str = "Could not read file";

// =============================================================================
// Entities
// =============================================================================

/// A stored file row without its content.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct StoredFile {
    pub id: i64,
    pub filename: String,
    /// Extension including the dot (".png"), or empty.
    pub filetype: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredFile {
    /// Name shown in lists.
    pub fn display(&self) -> &str {
        &self.filename
    }

    /// Cache file name: `<id><filetype>`.
    pub fn cache_name(&self) -> String {
        format!("{}{}", self.id, self.filetype)
    }
}

/// A stored file waiting to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStoredFile {
    pub filename: String,
    pub filetype: String,
    pub content: Vec<u8>,
}

impl NewStoredFile {
    /// Reads a file from disk. The name and type come from the path.
    ///
    /// ## Errors
    /// `UnreadableSource("Could not read file")`; the I/O error is logged.
    pub fn from_path(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "Could not read stored file source");
            DbError::UnreadableSource(UNREADABLE_FILE.to_string())
        })?;

        let (filename, filetype) = split_name(path);
        Ok(NewStoredFile {
            filename,
            filetype,
            content,
        })
    }

    /// Wraps an in-memory buffer. `name` supplies filename and type.
    pub fn from_bytes(name: &str, content: impl Into<Vec<u8>>) -> Self {
        let (filename, filetype) = split_name(Path::new(name));
        NewStoredFile {
            filename,
            filetype,
            content: content.into(),
        }
    }

    /// Creates an image variant of a file.
    ///
    /// ## How It Works
    /// 1. The source must decode as an image, even when nothing changes
    /// 2. No size and no format: the file is stored as-is
    /// 3. Otherwise a white RGB canvas of `size` (default: source size) is
    ///    created, the source is shrunk to fit, pasted centered, and the
    ///    canvas is encoded as `format` (default: source format and
    ///    extension)
    ///
    /// ## Errors
    /// - `UnreadableSource("Invalid image file")` - not an image
    /// - `InvalidImageFormat` - unknown output format
    pub fn image(
        path: impl AsRef<Path>,
        size: Option<(u32, u32)>,
        format: Option<&str>,
    ) -> DbResult<Self> {
        let path = path.as_ref();
        let reader = ImageReader::open(path)
            .and_then(ImageReader::with_guessed_format)
            .map_err(|e| invalid_image(path, e))?;
        let source_format = reader.format();
        let source = reader.decode().map_err(|e| invalid_image(path, e))?;

        if size.is_none() && format.is_none() {
            return Self::from_path(path);
        }

        let (filename, source_type) = split_name(path);
        let (extension, output_format) = match format {
            Some(requested) => {
                let extension = requested.trim_start_matches('.').to_lowercase();
                let output = ImageFormat::from_extension(&extension)
                    .ok_or_else(|| DbError::InvalidImageFormat(extension.clone()))?;
                (extension, output)
            }
            None => {
                let output = source_format
                    .ok_or_else(|| DbError::InvalidImageFormat(source_type.clone()))?;
                (source_type.trim_start_matches('.').to_string(), output)
            }
        };

        let (width, height) = size.unwrap_or((source.width(), source.height()));
        debug!(
            from = ?(source.width(), source.height()),
            to = ?(width, height),
            format = %extension,
            "Creating image variant"
        );

        let fitted = if source.width() > width || source.height() > height {
            source.thumbnail(width, height)
        } else {
            source
        };

        let mut canvas = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        let x = width.saturating_sub(fitted.width()) / 2;
        let y = height.saturating_sub(fitted.height()) / 2;
        imageops::overlay(&mut canvas, &fitted.to_rgb8(), i64::from(x), i64::from(y));

        let mut content = Vec::new();
        DynamicImage::ImageRgb8(canvas)
            .write_to(&mut Cursor::new(&mut content), output_format)
            .map_err(|e| {
                warn!(format = %extension, error = %e, "Image encoding failed");
                DbError::InvalidImageFormat(extension.clone())
            })?;

        Ok(NewStoredFile {
            filename,
            filetype: format!(".{}", extension),
            content,
        })
    }

    fn validate(&self) -> DbResult<()> {
        validate_filename(&self.filename)?;
        validate_filetype(&self.filetype)?;
        Ok(())
    }
}

/// Field assignments for [`StoredFileRepository::update`].
#[derive(Debug, Clone, Default)]
pub struct StoredFileUpdate {
    pub filename: Option<String>,
    pub filetype: Option<String>,
    pub content: Option<Vec<u8>>,
}

/// Splits "logo.png" into ("logo", ".png").
fn split_name(path: &Path) -> (String, String) {
    let filename = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let filetype = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    (filename, filetype)
}

fn invalid_image(path: &Path, err: impl Display) -> DbError {
    warn!(path = %path.display(), error = %err, "Not a readable image");
    DbError::UnreadableSource(INVALID_IMAGE.to_string())
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for stored files and their on-disk cache.
#[derive(Debug, Clone)]
pub struct StoredFileRepository {
    pool: SqlitePool,
    cache_dir: PathBuf,
}

impl StoredFileRepository {
    /// Creates a new StoredFileRepository.
    pub fn new(pool: SqlitePool, cache_dir: PathBuf) -> Self {
        StoredFileRepository { pool, cache_dir }
    }

    /// Inserts a file and returns the stored row.
    pub async fn create(&self, file: &NewStoredFile) -> DbResult<StoredFile> {
        file.validate()?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO storedfiles (filename, filetype, content)
            VALUES (?1, ?2, ?3)
            RETURNING id
            "#,
        )
        .bind(&file.filename)
        .bind(&file.filetype)
        .bind(&file.content)
        .fetch_one(&self.pool)
        .await?;

        info!(id, filename = %file.filename, bytes = file.content.len(), "Stored file created");
        self.get(id).await
    }

    /// Gets a file by id.
    ///
    /// ## Errors
    /// `NotFound` if the row doesn't exist.
    pub async fn get(&self, id: i64) -> DbResult<StoredFile> {
        sqlx::query_as::<_, StoredFile>(
            r#"
            SELECT id, filename, filetype, created_at, updated_at
            FROM storedfiles
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("StoredFile", id.to_string()))
    }

    /// Lists all files by name.
    pub async fn list(&self) -> DbResult<Vec<StoredFile>> {
        let files = sqlx::query_as::<_, StoredFile>(
            r#"
            SELECT id, filename, filetype, created_at, updated_at
            FROM storedfiles
            ORDER BY filename, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    /// Loads the deferred content of a file.
    pub async fn content(&self, id: i64) -> DbResult<Vec<u8>> {
        sqlx::query_scalar::<_, Vec<u8>>("SELECT content FROM storedfiles WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("StoredFile", id.to_string()))
    }

    /// Assigns the given fields in one transaction.
    ///
    /// ## Errors
    /// - `NotFound` if the row doesn't exist
    /// - `TransactionFailed` if any assignment is rejected; nothing is
    ///   changed in that case
    pub async fn update(&self, id: i64, update: &StoredFileUpdate) -> DbResult<StoredFile> {
        let mut tx = self.pool.begin().await?;

        match apply_update(&mut *tx, id, update).await {
            Ok(()) => {
                tx.commit()
                    .await
                    .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
            }
            Err(err @ DbError::NotFound { .. }) => {
                tx.rollback().await?;
                return Err(err);
            }
            Err(err) => {
                tx.rollback().await?;
                error!(id, error = %err, "Stored file update rolled back");
                return Err(DbError::TransactionFailed(err.to_string()));
            }
        }

        debug!(id, "Stored file updated");
        self.get(id).await
    }

    /// Deletes a file row. The cache file is left alone.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM storedfiles WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("StoredFile", id.to_string()));
        }

        info!(id, "Stored file deleted");
        Ok(())
    }

    /// Where a file is cached on disk.
    pub fn cache_path(&self, file: &StoredFile) -> PathBuf {
        self.cache_dir.join(file.cache_name())
    }

    /// Returns the cache path, writing the content on first access.
    pub async fn materialize(&self, file: &StoredFile) -> DbResult<PathBuf> {
        let path = self.cache_path(file);
        if path.is_file() {
            return Ok(path);
        }

        let content = self.content(file.id).await?;
        std::fs::create_dir_all(&self.cache_dir)?;
        std::fs::write(&path, content)?;

        debug!(id = file.id, path = %path.display(), "Stored file cached");
        Ok(path)
    }
}

async fn apply_update(
    conn: &mut SqliteConnection,
    id: i64,
    update: &StoredFileUpdate,
) -> DbResult<()> {
    let touched = sqlx::query(
        "UPDATE storedfiles SET updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now') WHERE id = ?1",
    )
    .bind(id)
    .execute(&mut *conn)
    .await?;
    if touched.rows_affected() == 0 {
        return Err(DbError::not_found("StoredFile", id.to_string()));
    }

    if let Some(filename) = &update.filename {
        sqlx::query("UPDATE storedfiles SET filename = ?1 WHERE id = ?2")
            .bind(filename)
            .bind(id)
            .execute(&mut *conn)
            .await?;
    }
    if let Some(filetype) = &update.filetype {
        sqlx::query("UPDATE storedfiles SET filetype = ?1 WHERE id = ?2")
            .bind(filetype)
            .bind(id)
            .execute(&mut *conn)
            .await?;
    }
    if let Some(content) = &update.content {
        sqlx::query("UPDATE storedfiles SET content = ?1 WHERE id = ?2")
            .bind(content)
            .bind(id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
