use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::data::{Photo, PhotoId, StorageRef, TransferResponse, WriteLocation};
use super::store::MediaStore;
use crate::error::StoreError;

const DB_FILE: &str = "gallery.db";
const BLOB_DIR: &str = "blobs";

/// The Library is the local media store.
/// Photo records live in an SQLite database, uploaded bytes live as
/// plain files in a blob directory next to it.
///
/// Every operation opens its own connection on a blocking thread
/// (rusqlite::Connection is not Sync), so a Library is cheap to clone
/// and can be moved into background tasks.
#[derive(Clone)]
pub struct Library {
    db_path: PathBuf,
    blob_dir: PathBuf,
}

impl Library {
    /// Open (or create) the library rooted at `root`.
    ///
    /// Layout:
    /// - `<root>/gallery.db` photo records, blob index, upload slots
    /// - `<root>/blobs/` uploaded files
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        let blob_dir = root.join(BLOB_DIR);
        std::fs::create_dir_all(&blob_dir)?;

        let library = Library {
            db_path: root.join(DB_FILE),
            blob_dir,
        };

        let conn = library.connect()?;
        init_schema(&conn)?;

        info!(path = %library.db_path.display(), "photo library initialized");
        Ok(library)
    }

    /// Get a count of photos in the library
    pub fn photo_count(&self) -> Result<i64, StoreError> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM photos", [], |row| row.get(0))?;
        Ok(count)
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    /// Run a database job on the blocking pool with a fresh connection
    async fn blocking<T, F>(&self, job: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection, &Path) -> Result<T, StoreError> + Send + 'static,
    {
        let library = self.clone();
        tokio::task::spawn_blocking(move || {
            let conn = library.connect()?;
            job(&conn, &library.blob_dir)
        })
        .await?
    }
}

/// Create all tables and indexes if they don't exist.
fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS photos (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            storage_id      TEXT NOT NULL,
            caption         TEXT,
            created_at      INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_photos_created_at
            ON photos(created_at DESC);

        CREATE TABLE IF NOT EXISTS blobs (
            storage_id      TEXT PRIMARY KEY,
            content_type    TEXT NOT NULL,
            size            INTEGER NOT NULL,
            file_name       TEXT NOT NULL,
            stored_at       INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS upload_slots (
            token           TEXT PRIMARY KEY,
            issued_at       INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS store_meta (
            key             TEXT PRIMARY KEY,
            value           INTEGER NOT NULL
        );

        INSERT OR IGNORE INTO store_meta (key, value) VALUES ('revision', 0);",
    )?;

    debug!("database schema initialized");
    Ok(())
}

fn bump_revision(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE store_meta SET value = value + 1 WHERE key = 'revision'",
        [],
    )?;
    Ok(())
}

/// File extension for a stored blob, derived from its MIME type
fn blob_extension(content_type: &str) -> &'static str {
    image::ImageFormat::from_mime_type(content_type)
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or("bin")
}

fn error_body(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

#[async_trait]
impl MediaStore for Library {
    async fn issue_write_location(&self) -> Result<WriteLocation, StoreError> {
        self.blocking(|conn, _| {
            let token = Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO upload_slots (token, issued_at) VALUES (?1, ?2)",
                params![token, Utc::now().timestamp_millis()],
            )?;
            Ok(WriteLocation(token))
        })
        .await
    }

    async fn transfer(
        &self,
        location: &WriteLocation,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<TransferResponse, StoreError> {
        let token = location.0.clone();
        let content_type = content_type.to_string();

        self.blocking(move |conn, blob_dir| {
            // Slot claim, index row and file land together or not at all
            let tx = conn.unchecked_transaction()?;

            let claimed = tx.execute("DELETE FROM upload_slots WHERE token = ?1", params![token])?;
            if claimed == 0 {
                warn!(%token, "transfer to unknown or used write location");
                return Ok(TransferResponse {
                    status: 410,
                    body: error_body("write location expired or already used"),
                });
            }

            if bytes.is_empty() {
                tx.commit()?;
                return Ok(TransferResponse {
                    status: 400,
                    body: error_body("empty upload"),
                });
            }

            let storage_id = Uuid::new_v4().to_string();
            let file_name = format!("{}.{}", storage_id, blob_extension(&content_type));

            tx.execute(
                "INSERT INTO blobs (storage_id, content_type, size, file_name, stored_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    storage_id,
                    content_type,
                    bytes.len() as i64,
                    file_name,
                    Utc::now().timestamp_millis(),
                ],
            )?;

            let blob_path = blob_dir.join(&file_name);
            std::fs::write(&blob_path, &bytes)?;

            if let Err(err) = tx.commit() {
                let _ = std::fs::remove_file(&blob_path);
                return Err(err.into());
            }

            debug!(%storage_id, size = bytes.len(), "stored blob");
            Ok(TransferResponse {
                status: 200,
                body: serde_json::json!({ "storageId": storage_id }).to_string(),
            })
        })
        .await
    }

    async fn commit_photo(
        &self,
        storage: &StorageRef,
        caption: Option<&str>,
    ) -> Result<(), StoreError> {
        let storage = storage.clone();
        let caption = caption.map(str::to_string);

        self.blocking(move |conn, _| {
            let known: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM blobs WHERE storage_id = ?1)",
                params![storage.as_str()],
                |row| row.get(0),
            )?;
            if !known {
                return Err(StoreError::UnknownStorage(storage.0));
            }

            let tx = conn.unchecked_transaction()?;
            tx.execute(
                "INSERT INTO photos (storage_id, caption, created_at) VALUES (?1, ?2, ?3)",
                params![storage.as_str(), caption, Utc::now().timestamp_millis()],
            )?;
            bump_revision(&tx)?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn list_photos(&self) -> Result<Vec<Photo>, StoreError> {
        self.blocking(|conn, _| {
            let mut stmt = conn.prepare(
                "SELECT id, storage_id, caption, created_at FROM photos
                 ORDER BY created_at DESC, id DESC",
            )?;

            let rows = stmt.query_map([], |row| {
                Ok(Photo {
                    id: PhotoId(row.get(0)?),
                    storage: StorageRef(row.get(1)?),
                    caption: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?;

            let mut photos = Vec::new();
            for photo in rows {
                photos.push(photo?);
            }
            Ok(photos)
        })
        .await
    }

    async fn resolve_url(&self, storage: &StorageRef) -> Result<Option<String>, StoreError> {
        let storage = storage.clone();
        self.blocking(move |conn, blob_dir| {
            let file_name: Option<String> = conn
                .query_row(
                    "SELECT file_name FROM blobs WHERE storage_id = ?1",
                    params![storage.as_str()],
                    |row| row.get(0),
                )
                .optional()?;

            Ok(file_name
                .map(|name| blob_dir.join(name))
                .filter(|path| path.exists())
                .map(|path| path.to_string_lossy().into_owned()))
        })
        .await
    }

    /// Removes the record only. The blob stays on disk.
    async fn delete_photo(&self, id: PhotoId) -> Result<(), StoreError> {
        self.blocking(move |conn, _| {
            let tx = conn.unchecked_transaction()?;
            let removed = tx.execute("DELETE FROM photos WHERE id = ?1", params![id.0])?;
            if removed == 0 {
                return Err(StoreError::NotFound(id));
            }
            bump_revision(&tx)?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn revision(&self) -> Result<u64, StoreError> {
        self.blocking(|conn, _| {
            let value: i64 = conn.query_row(
                "SELECT value FROM store_meta WHERE key = 'revision'",
                [],
                |row| row.get(0),
            )?;
            Ok(value.max(0) as u64)
        })
        .await
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .field("blob_dir", &self.blob_dir)
            .finish()
    }
}
