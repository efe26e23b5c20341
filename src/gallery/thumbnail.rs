use image::{imageops::FilterType, DynamicImage};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::state::data::ResolvedPhoto;

/// Size of generated thumbnails (square bound)
const THUMBNAIL_SIZE: u32 = 256;

/// Get the default thumbnail cache directory
/// Returns ~/.cache/greeting-card/thumbnails on Linux
pub fn default_cache_dir() -> PathBuf {
    let mut path = dirs_next::cache_dir()
        .or_else(dirs_next::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    path.push("greeting-card");
    path.push("thumbnails");
    path
}

/// Get the thumbnail path for a storage key (doesn't generate, just returns the expected path)
pub fn thumbnail_path(cache_dir: &Path, key: &str) -> PathBuf {
    cache_dir.join(format!("{}.jpg", key))
}

/// Return the cached thumbnail for `source`, generating it on first use.
/// Returns None if the source can't be decoded.
pub fn ensure_thumbnail(source: &Path, key: &str, cache_dir: &Path) -> Option<PathBuf> {
    let target = thumbnail_path(cache_dir, key);
    if target.exists() {
        return Some(target);
    }

    fs::create_dir_all(cache_dir).ok()?;

    let img = match image::open(source) {
        Ok(img) => img,
        Err(err) => {
            warn!(source = %source.display(), error = %err, "could not decode photo for thumbnail");
            return None;
        }
    };

    // JPEG has no alpha channel
    let thumbnail = img.resize(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Lanczos3);
    let thumbnail = DynamicImage::ImageRgb8(thumbnail.to_rgb8());

    if let Err(err) = thumbnail.save(&target) {
        warn!(target = %target.display(), error = %err, "could not save thumbnail");
        return None;
    }

    debug!(target = %target.display(), "generated thumbnail");
    Some(target)
}

/// Fill in grid thumbnails for every photo whose URL is a local file
pub async fn attach_thumbnails(photos: Vec<ResolvedPhoto>, cache_dir: PathBuf) -> Vec<ResolvedPhoto> {
    let fallback = photos.clone();

    let result = tokio::task::spawn_blocking(move || {
        let mut photos = photos;
        for photo in &mut photos {
            let Some(url) = photo.url.as_deref() else {
                continue;
            };
            let source = Path::new(url);
            if source.is_file() {
                photo.thumbnail = ensure_thumbnail(source, photo.photo.storage.as_str(), &cache_dir);
            }
        }
        photos
    })
    .await;

    match result {
        Ok(photos) => photos,
        Err(err) => {
            warn!(error = %err, "thumbnail generation task failed");
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::{Photo, PhotoId, StorageRef};
    use image::{Rgba, RgbaImage};

    fn write_png(path: &Path, width: u32, height: u32) {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 30, 30, 128]));
        img.save(path).unwrap();
    }

    #[test]
    fn test_generates_bounded_thumbnail_once() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("big.png");
        write_png(&source, 1024, 512);
        let cache = dir.path().join("cache");

        let thumb = ensure_thumbnail(&source, "abc", &cache).unwrap();
        assert_eq!(thumb, thumbnail_path(&cache, "abc"));

        let decoded = image::open(&thumb).unwrap();
        assert_eq!(decoded.width(), 256);
        assert_eq!(decoded.height(), 128);

        // Cached result is reused even if the source is gone
        fs::remove_file(&source).unwrap();
        assert_eq!(ensure_thumbnail(&source, "abc", &cache), Some(thumb));
    }

    #[test]
    fn test_undecodable_source_has_no_thumbnail() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("broken.png");
        fs::write(&source, b"definitely not a png").unwrap();

        assert!(ensure_thumbnail(&source, "broken", dir.path()).is_none());
    }

    #[tokio::test]
    async fn test_attach_skips_pending_and_remote_urls() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("photo.png");
        write_png(&source, 64, 64);

        let make = |id: i64, url: Option<String>| ResolvedPhoto {
            photo: Photo {
                id: PhotoId(id),
                storage: StorageRef(format!("s{}", id)),
                caption: None,
                created_at: id,
            },
            url,
            thumbnail: None,
        };
        let photos = vec![
            make(1, Some(source.to_string_lossy().into_owned())),
            make(2, None),
            make(3, Some("mem://elsewhere".to_string())),
        ];

        let photos = attach_thumbnails(photos, dir.path().join("cache")).await;
        assert!(photos[0].thumbnail.is_some());
        assert!(photos[1].thumbnail.is_none());
        assert!(photos[2].thumbnail.is_none());
    }
}
