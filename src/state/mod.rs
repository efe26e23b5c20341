/// State management module
///
/// This module handles the durable side of the gallery:
/// - The media store contract (store.rs)
/// - The SQLite-backed local store (library.rs)
/// - Shared data structures (data.rs)

pub mod data;
pub mod library;
pub mod store;

#[cfg(test)]
pub mod fake_store;
