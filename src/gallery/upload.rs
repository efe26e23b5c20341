/// Upload pipeline
///
/// Turns local files into photo records, one file at a time:
/// 1. read the file
/// 2. request a write location from the store
/// 3. transfer the bytes with the file's content type
/// 4. parse the storage reference out of the transfer response
/// 5. commit the photo record
///
/// A file that fails at any step is reported and skipped; the rest of the
/// batch carries on. A commit failure after a good transfer leaves the blob
/// orphaned in the store, nothing is rolled back.

use serde::Deserialize;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{TransferFailure, UploadError};
use crate::state::data::{StorageRef, UploadFile};
use crate::state::store::MediaStore;

/// MIME pattern accepted by the drop zone and the file picker
pub const ACCEPTED_MIME: &str = "image/*";

const FALLBACK_MIME: &str = "application/octet-stream";

/// Match a MIME type against an exact type or a `type/*` wildcard
pub fn mime_matches(pattern: &str, mime: &str) -> bool {
    let mime = mime
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match pattern.split_once('/') {
        Some((kind, "*")) => mime
            .split_once('/')
            .is_some_and(|(k, sub)| k == kind && !sub.is_empty()),
        _ => mime == pattern,
    }
}

/// Declared content type of a local file, guessed from its extension
pub fn content_type_for(path: &Path) -> String {
    image::ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| FALLBACK_MIME.to_string())
}

/// Expand dropped or picked paths into accepted upload files.
///
/// Folders are walked recursively in file-name order. Anything that is not
/// an image is dropped here and never reaches the pipeline.
pub fn collect_uploads(paths: &[PathBuf]) -> Vec<UploadFile> {
    let mut files = Vec::new();

    for root in paths {
        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let content_type = content_type_for(path);
            if !mime_matches(ACCEPTED_MIME, &content_type) {
                debug!(path = %path.display(), %content_type, "ignoring non-image file");
                continue;
            }

            files.push(UploadFile {
                path: path.to_path_buf(),
                content_type,
            });
        }
    }

    files
}

/// `collect_uploads` on the blocking pool, so large folders don't stall the UI
pub async fn collect_uploads_async(paths: Vec<PathBuf>) -> Vec<UploadFile> {
    match tokio::task::spawn_blocking(move || collect_uploads(&paths)).await {
        Ok(files) => files,
        Err(err) => {
            warn!(error = %err, "scanning dropped files failed");
            Vec::new()
        }
    }
}

/// Result of uploading a single file
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<StorageRef, UploadError>,
}

/// Per-file results of one batch, in input order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn committed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Path, &UploadError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|err| (o.path.as_path(), err)))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransferBody {
    storage_id: String,
}

fn parse_storage_ref(body: &str) -> Result<StorageRef, serde_json::Error> {
    let body: TransferBody = serde_json::from_str(body)?;
    Ok(StorageRef(body.storage_id))
}

/// Upload a batch strictly sequentially, in input order
pub async fn upload_batch<S>(store: &S, files: Vec<UploadFile>) -> BatchReport
where
    S: MediaStore + ?Sized,
{
    let mut report = BatchReport::default();
    info!(files = files.len(), "starting upload batch");

    for file in files {
        let result = upload_file(store, &file).await;
        match &result {
            Ok(storage) => info!(path = %file.path.display(), %storage, "uploaded photo"),
            Err(err) => warn!(path = %file.path.display(), error = %err, "upload failed"),
        }
        report.outcomes.push(FileOutcome {
            path: file.path,
            result,
        });
    }

    info!(
        committed = report.committed(),
        failed = report.outcomes.len() - report.committed(),
        "upload batch finished"
    );
    report
}

async fn upload_file<S>(store: &S, file: &UploadFile) -> Result<StorageRef, UploadError>
where
    S: MediaStore + ?Sized,
{
    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|source| UploadError::Read {
            path: file.path.clone(),
            source,
        })?;

    let location = store
        .issue_write_location()
        .await
        .map_err(UploadError::LocationRequest)?;

    let response = store
        .transfer(&location, bytes, &file.content_type)
        .await
        .map_err(|err| UploadError::Transfer(TransferFailure::Transport(err)))?;

    if !response.is_success() {
        return Err(UploadError::Transfer(TransferFailure::Status(response.status)));
    }

    let storage = parse_storage_ref(&response.body)
        .map_err(|err| UploadError::Transfer(TransferFailure::Malformed(err)))?;

    store
        .commit_photo(&storage, None)
        .await
        .map_err(UploadError::Commit)?;

    Ok(storage)
}

/// Keeps at most one batch in flight.
/// Files arriving while a batch runs wait for the next one.
#[derive(Debug, Default)]
pub struct UploadQueue {
    pending: VecDeque<UploadFile>,
    in_flight: bool,
}

impl UploadQueue {
    pub fn enqueue(&mut self, files: impl IntoIterator<Item = UploadFile>) {
        self.pending.extend(files);
    }

    /// Take everything queued so far, unless a batch is already running
    pub fn next_batch(&mut self) -> Option<Vec<UploadFile>> {
        if self.in_flight || self.pending.is_empty() {
            return None;
        }
        self.in_flight = true;
        Some(self.pending.drain(..).collect())
    }

    pub fn finish_batch(&mut self) {
        self.in_flight = false;
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }
}
