//! Scenery API - scene service and HTTP surface
//!
//! The request-handling layer of the service:
//! - Upload intake: multipart staging with type/size filtering
//! - Scene service: ownership-checked transactions over store + gateway
//! - Routes: the warp filter tree and error shaping
//! - Auth: seam for the external session collaborator
//!
//! Each handler is a single-shot, stateless request/response transaction;
//! all state lives in the record store and the object store.

#![warn(unreachable_pub)]

pub mod auth;
pub mod config;
pub mod error;
pub mod intake;
pub mod routes;
pub mod service;

// Re-exports for convenience
pub use auth::{AuthError, Authenticator, RemoteAuthenticator};
pub use config::ServerConfig;
pub use error::ServiceError;
pub use intake::StagedUpload;
pub use routes::api;
pub use service::SceneService;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
