//! Error types for the asset store gateway

/// Errors raised by the asset store gateway
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// The remote upload call failed (network, auth, quota)
    #[error("upload failed: {0}")]
    UploadFailed(String),

    /// The remote deletion call failed
    #[error("delete failed: {0}")]
    DeleteFailed(String),

    /// The staged file could not be read
    #[error("staged file unreadable: {0}")]
    Io(#[from] std::io::Error),
}
