//! In-memory media store with failure injection, for tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::data::{Photo, PhotoId, StorageRef, TransferResponse, WriteLocation};
use super::store::MediaStore;
use crate::error::StoreError;

/// Failure planted for the n-th call (0-based) of one store operation
#[derive(Debug, Default, Clone)]
pub struct FailurePlan {
    pub location_on: Option<usize>,
    pub transfer_status_on: Option<(usize, u16)>,
    pub malformed_transfer_on: Option<usize>,
    pub commit_on: Option<usize>,
    pub delete_fails: bool,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    clock: i64,
    revision: u64,
    photos: Vec<Photo>,
    blobs: HashMap<String, Vec<u8>>,
    unresolved: Vec<String>,
    location_calls: usize,
    transfer_calls: usize,
    commit_calls: usize,
    uploaded_types: Vec<String>,
}

#[derive(Debug, Default)]
pub struct FakeStore {
    plan: FailurePlan,
    inner: Mutex<Inner>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plan(plan: FailurePlan) -> Self {
        FakeStore {
            plan,
            inner: Mutex::default(),
        }
    }

    /// Insert a record directly, bypassing the upload steps
    pub fn seed(&self, storage: &str, created_at: i64) -> PhotoId {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = PhotoId(inner.next_id);
        inner.blobs.insert(storage.to_string(), Vec::new());
        inner.photos.push(Photo {
            id,
            storage: StorageRef(storage.to_string()),
            caption: None,
            created_at,
        });
        inner.revision += 1;
        id
    }

    /// Keep resolution of this asset pending
    pub fn hold_resolution(&self, storage: &str) {
        self.inner.lock().unwrap().unresolved.push(storage.to_string());
    }

    pub fn committed(&self) -> Vec<Photo> {
        self.inner.lock().unwrap().photos.clone()
    }

    pub fn blob(&self, storage: &StorageRef) -> Option<Vec<u8>> {
        self.inner.lock().unwrap().blobs.get(storage.as_str()).cloned()
    }

    pub fn uploaded_types(&self) -> Vec<String> {
        self.inner.lock().unwrap().uploaded_types.clone()
    }
}

#[async_trait]
impl MediaStore for FakeStore {
    async fn issue_write_location(&self) -> Result<WriteLocation, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let call = inner.location_calls;
        inner.location_calls += 1;
        if self.plan.location_on == Some(call) {
            return Err(StoreError::Unavailable("location service down".to_string()));
        }
        Ok(WriteLocation(format!("slot-{}", call)))
    }

    async fn transfer(
        &self,
        location: &WriteLocation,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<TransferResponse, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let call = inner.transfer_calls;
        inner.transfer_calls += 1;

        if let Some((on, status)) = self.plan.transfer_status_on {
            if on == call {
                return Ok(TransferResponse {
                    status,
                    body: String::new(),
                });
            }
        }
        if self.plan.malformed_transfer_on == Some(call) {
            return Ok(TransferResponse {
                status: 200,
                body: "<html>oops</html>".to_string(),
            });
        }

        let storage_id = format!("blob-{}", location.0);
        inner.blobs.insert(storage_id.clone(), bytes);
        inner.uploaded_types.push(content_type.to_string());
        Ok(TransferResponse {
            status: 200,
            body: format!(r#"{{"storageId":"{}"}}"#, storage_id),
        })
    }

    async fn commit_photo(
        &self,
        storage: &StorageRef,
        caption: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let call = inner.commit_calls;
        inner.commit_calls += 1;
        if self.plan.commit_on == Some(call) {
            return Err(StoreError::Unavailable("metadata service down".to_string()));
        }

        inner.next_id += 1;
        inner.clock += 1;
        let photo = Photo {
            id: PhotoId(inner.next_id),
            storage: storage.clone(),
            caption: caption.map(str::to_string),
            created_at: inner.clock,
        };
        inner.photos.push(photo);
        inner.revision += 1;
        Ok(())
    }

    async fn list_photos(&self) -> Result<Vec<Photo>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut photos = inner.photos.clone();
        photos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(photos)
    }

    async fn resolve_url(&self, storage: &StorageRef) -> Result<Option<String>, StoreError> {
        let inner = self.inner.lock().unwrap();
        if inner.unresolved.iter().any(|s| s == storage.as_str()) {
            return Ok(None);
        }
        Ok(inner
            .blobs
            .contains_key(storage.as_str())
            .then(|| format!("mem://{}", storage)))
    }

    async fn delete_photo(&self, id: PhotoId) -> Result<(), StoreError> {
        if self.plan.delete_fails {
            return Err(StoreError::Unavailable("delete refused".to_string()));
        }
        let mut inner = self.inner.lock().unwrap();
        let before = inner.photos.len();
        inner.photos.retain(|photo| photo.id != id);
        if inner.photos.len() == before {
            return Err(StoreError::NotFound(id));
        }
        inner.revision += 1;
        Ok(())
    }

    async fn revision(&self) -> Result<u64, StoreError> {
        Ok(self.inner.lock().unwrap().revision)
    }
}
