/// Photo gallery module
///
/// This module handles:
/// - Uploading dropped or picked files into the media store (upload.rs)
/// - The newest-first photo list read model (projection.rs)
/// - Full-screen viewer navigation (lightbox.rs)
/// - Grid thumbnails cached on disk (thumbnail.rs)

pub mod lightbox;
pub mod projection;
pub mod thumbnail;
pub mod upload;
