//! Error types for the scene record store

/// Errors raised by the record store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Query or connection failure from the database driver
    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),

    /// Filesystem failure while preparing the database location
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// A stored row could not be mapped back to a scene
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let err = StoreError::Corrupt("bad id".to_string());
        assert!(err.to_string().contains("corrupt record"));
    }
}
