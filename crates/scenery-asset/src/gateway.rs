//! Object store gateway trait and HTTP implementation
//!
//! The external store receives raw file content and answers with a stable
//! URL plus an opaque identifier; it can later delete by that identifier.
//! Credentials arrive as an injected [`AssetStoreConfig`], never as
//! ambient process-wide state.

use crate::error::AssetError;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

/// Application-scoped namespace for published model files
pub const DEFAULT_FOLDER: &str = "scenery/models";

/// Configuration for the external object store
#[derive(Debug, Clone)]
pub struct AssetStoreConfig {
    /// Base URL of the object-store API
    pub base_url: String,
    /// Bearer credential for the store
    pub api_key: String,
    /// Namespace folder uploads are placed under
    pub folder: String,
}

impl AssetStoreConfig {
    /// Create new configuration with the default namespace folder
    #[inline]
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            folder: DEFAULT_FOLDER.to_string(),
        }
    }

    /// With namespace folder
    #[inline]
    #[must_use]
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into();
        self
    }
}

/// Result of publishing a file to the object store
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedAsset {
    /// Externally resolvable URL of the stored asset
    pub url: String,
    /// Opaque identifier accepted by delete-by-identifier
    pub asset_id: String,
}

/// Abstraction over the external object-storage service
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload file content under the application namespace.
    ///
    /// # Errors
    /// `AssetError::UploadFailed` aborts the enclosing transaction; no
    /// retry, no partial record is created by callers.
    async fn publish(
        &self,
        file: &Path,
        original_name: &str,
    ) -> Result<PublishedAsset, AssetError>;

    /// Request deletion of a previously published asset.
    ///
    /// # Errors
    /// `AssetError::DeleteFailed` is surfaced to the caller; per current
    /// design it does not block the corresponding record deletion.
    async fn retract(&self, asset_id: &str) -> Result<(), AssetError>;
}

/// HTTP client for the object-store API.
pub struct HttpAssetStore {
    http: reqwest::Client,
    config: AssetStoreConfig,
}

impl HttpAssetStore {
    /// Create new gateway from injected configuration
    #[inline]
    #[must_use]
    pub fn new(config: AssetStoreConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn assets_url(&self) -> String {
        format!("{}/assets", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ObjectStore for HttpAssetStore {
    async fn publish(
        &self,
        file: &Path,
        original_name: &str,
    ) -> Result<PublishedAsset, AssetError> {
        let content = tokio::fs::read(file).await?;

        let part = reqwest::multipart::Part::bytes(content)
            .file_name(original_name.to_string());
        let form = reqwest::multipart::Form::new()
            .text("folder", self.config.folder.clone())
            .part("file", part);

        let response = self
            .http
            .post(self.assets_url())
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AssetError::UploadFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| AssetError::UploadFailed(e.to_string()))?;

        let published: PublishedAsset = response
            .json()
            .await
            .map_err(|e| AssetError::UploadFailed(format!("malformed store response: {e}")))?;

        tracing::debug!(asset = %published.asset_id, "asset published");
        Ok(published)
    }

    async fn retract(&self, asset_id: &str) -> Result<(), AssetError> {
        self.http
            .delete(format!("{}/{asset_id}", self.assets_url()))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| AssetError::DeleteFailed(e.to_string()))?
            .error_for_status()
            .map_err(|e| AssetError::DeleteFailed(e.to_string()))?;

        tracing::debug!(asset = %asset_id, "asset retracted");
        Ok(())
    }
}
