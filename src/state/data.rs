/// Shared data structures for the gallery
///
/// These structs represent the data model that flows between
/// the media store and the UI layer.

use std::fmt;
use std::path::PathBuf;

/// Store-assigned identity of a photo record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhotoId(pub i64);

/// Opaque handle to an uploaded binary asset
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageRef(pub String);

impl StorageRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Single-use destination for one byte transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteLocation(pub String);

/// Raw answer of a byte transfer, before it is parsed into a `StorageRef`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferResponse {
    pub status: u16,
    pub body: String,
}

impl TransferResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A single stored photo record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub id: PhotoId,
    /// Set once at creation, never rewritten
    pub storage: StorageRef,
    pub caption: Option<String>,
    /// Epoch milliseconds
    pub created_at: i64,
}

/// A photo together with its display location
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPhoto {
    pub photo: Photo,
    /// None while the store has not resolved the asset yet
    pub url: Option<String>,
    /// 256px grid thumbnail (None if not yet generated)
    pub thumbnail: Option<PathBuf>,
}

impl ResolvedPhoto {
    pub fn id(&self) -> PhotoId {
        self.photo.id
    }

    pub fn is_viewable(&self) -> bool {
        self.url.is_some()
    }
}

/// A local file queued for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub path: PathBuf,
    /// Declared MIME type, e.g. "image/jpeg"
    pub content_type: String,
}
