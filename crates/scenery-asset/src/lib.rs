//! Scenery Asset - gateway to the external object store
//!
//! Abstracts the service that hosts uploaded model files:
//! - `publish` uploads a staged file and returns its URL plus a deletion handle
//! - `retract` asks the store to delete a previously published asset
//!
//! Remote failures surface immediately; nothing here retries.

#![warn(unreachable_pub)]

pub mod error;
pub mod gateway;

// Re-exports for convenience
pub use error::AssetError;
pub use gateway::{AssetStoreConfig, HttpAssetStore, ObjectStore, PublishedAsset, DEFAULT_FOLDER};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
