/// The media store contract consumed by the gallery
///
/// The upload pipeline, the list projection and the viewer's delete action
/// only ever talk to the store through this trait. `Library` is the
/// SQLite-backed implementation used by the application.

use async_trait::async_trait;

use super::data::{Photo, PhotoId, StorageRef, TransferResponse, WriteLocation};
use crate::error::StoreError;

#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Issue a single-use destination for the next transfer
    async fn issue_write_location(&self) -> Result<WriteLocation, StoreError>;

    /// Send the bytes of one file to a previously issued location.
    ///
    /// A successful response body is a JSON object carrying a `storageId`.
    async fn transfer(
        &self,
        location: &WriteLocation,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<TransferResponse, StoreError>;

    /// Insert a photo record with a store-assigned id and the current time
    async fn commit_photo(
        &self,
        storage: &StorageRef,
        caption: Option<&str>,
    ) -> Result<(), StoreError>;

    /// All photo records, newest first
    async fn list_photos(&self) -> Result<Vec<Photo>, StoreError>;

    /// Display location of an asset, None while unresolved
    async fn resolve_url(&self, storage: &StorageRef) -> Result<Option<String>, StoreError>;

    async fn delete_photo(&self, id: PhotoId) -> Result<(), StoreError>;

    /// Change counter, bumped by every commit and delete
    async fn revision(&self) -> Result<u64, StoreError>;
}
