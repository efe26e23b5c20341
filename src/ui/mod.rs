/// View code
///
/// - Card section with the canvas-drawn cover (card.rs)
/// - Drop zone, thumbnail grid and full-screen viewer (gallery.rs)

pub mod card;
pub mod gallery;
