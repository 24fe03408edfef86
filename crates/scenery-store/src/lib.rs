//! Scenery Store - Scene entity and record persistence
//!
//! Provides the core data model and its SQLite-backed store:
//! - Scene records pairing an externally hosted model with camera state
//! - Owner-scoped queries for listing and single-record reads
//! - In-place persistence of camera mutations

#![warn(unreachable_pub)]

pub mod error;
pub mod scene;
pub mod store;

// Re-exports for convenience
pub use error::StoreError;
pub use scene::{OwnerId, Scene, SceneId, Vec3};
pub use store::{SceneRepo, SqliteSceneStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
