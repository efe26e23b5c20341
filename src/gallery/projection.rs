/// Gallery list projection
///
/// Read model over the media store: every stored photo with its display
/// URL, newest first. It never writes to the store. The application feeds
/// it snapshots, and a snapshot is only rebuilt when the store's revision
/// counter moved since the last one.

use std::cmp::Ordering;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::state::data::{Photo, ResolvedPhoto};
use crate::state::store::MediaStore;

/// The photo list as of one store revision
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub revision: u64,
    pub photos: Vec<ResolvedPhoto>,
}

/// Newest first; equal timestamps fall back to the larger id first
fn newest_first(a: &Photo, b: &Photo) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

/// Build a snapshot if the store changed since `known_revision`.
///
/// URL resolution is per photo: a failed or pending lookup leaves that
/// photo's `url` empty instead of failing the whole list.
pub async fn fetch_snapshot<S>(
    store: &S,
    known_revision: Option<u64>,
) -> Result<Option<Snapshot>, StoreError>
where
    S: MediaStore + ?Sized,
{
    let revision = store.revision().await?;
    if known_revision == Some(revision) {
        return Ok(None);
    }

    let records = store.list_photos().await?;
    let mut photos = Vec::with_capacity(records.len());

    for photo in records {
        let url = match store.resolve_url(&photo.storage).await {
            Ok(url) => url,
            Err(err) => {
                warn!(storage = %photo.storage, error = %err, "could not resolve photo");
                None
            }
        };
        photos.push(ResolvedPhoto {
            photo,
            url,
            thumbnail: None,
        });
    }

    debug!(revision, photos = photos.len(), "gallery snapshot built");
    Ok(Some(Snapshot { revision, photos }))
}

/// The current photo list as seen by the UI
#[derive(Debug, Default)]
pub struct Projection {
    revision: Option<u64>,
    photos: Vec<ResolvedPhoto>,
}

impl Projection {
    pub fn photos(&self) -> &[ResolvedPhoto] {
        &self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    /// Revision of the last applied snapshot
    pub fn revision(&self) -> Option<u64> {
        self.revision
    }

    /// Replace the list with a newer snapshot. Older snapshots are ignored.
    pub fn apply(&mut self, snapshot: Snapshot) -> bool {
        if self.revision.is_some_and(|current| snapshot.revision < current) {
            debug!(
                stale = snapshot.revision,
                current = ?self.revision,
                "dropping out-of-date gallery snapshot"
            );
            return false;
        }

        let mut photos = snapshot.photos;
        photos.sort_by(|a, b| newest_first(&a.photo, &b.photo));

        self.revision = Some(snapshot.revision);
        self.photos = photos;
        true
    }
}
