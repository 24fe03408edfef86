//! Testing utilities for the scenery workspace
//!
//! Shared fixtures: a recording object-store stub, a static-token
//! authenticator, and multipart body builders.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use scenery_api::auth::{AuthError, Authenticator};
use scenery_asset::{AssetError, ObjectStore, PublishedAsset};
use scenery_store::{OwnerId, Scene};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Leading bytes of a binary glTF container, enough to look like a model.
pub const GLB_SAMPLE: &[u8] = b"glTF\x02\x00\x00\x00\x44\x00\x00\x00fake-glb-payload";

/// Object store that records calls instead of talking to a network.
///
/// Publishes answer with a URL and asset id derived from the original
/// filename. Failure flags flip either operation into its gateway error.
#[derive(Default)]
pub struct StubObjectStore {
    pub published: Mutex<Vec<(PathBuf, String)>>,
    pub retracted: Mutex<Vec<String>>,
    pub fail_publish: bool,
    pub fail_retract: bool,
}

impl StubObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_publish() -> Self {
        Self {
            fail_publish: true,
            ..Self::default()
        }
    }

    pub fn failing_retract() -> Self {
        Self {
            fail_retract: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ObjectStore for StubObjectStore {
    async fn publish(
        &self,
        file: &Path,
        original_name: &str,
    ) -> Result<PublishedAsset, AssetError> {
        if self.fail_publish {
            return Err(AssetError::UploadFailed("stub store refused".to_string()));
        }
        self.published
            .lock()
            .push((file.to_path_buf(), original_name.to_string()));
        Ok(PublishedAsset {
            url: format!("https://cdn.test/scenery/models/{original_name}"),
            asset_id: format!("ast-{original_name}"),
        })
    }

    async fn retract(&self, asset_id: &str) -> Result<(), AssetError> {
        if self.fail_retract {
            return Err(AssetError::DeleteFailed("stub store refused".to_string()));
        }
        self.retracted.lock().push(asset_id.to_string());
        Ok(())
    }
}

/// Authenticator backed by a fixed token table.
#[derive(Default)]
pub struct StaticAuth {
    tokens: HashMap<String, OwnerId>,
}

impl StaticAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token and return the owner identity it resolves to.
    pub fn issue(&mut self, token: &str) -> OwnerId {
        let owner = OwnerId::new();
        self.tokens.insert(token.to_string(), owner);
        owner
    }
}

#[async_trait]
impl Authenticator for StaticAuth {
    async fn authenticate(&self, token: &str) -> Result<OwnerId, AuthError> {
        self.tokens
            .get(token)
            .copied()
            .ok_or(AuthError::TokenRejected)
    }
}

/// A scene with a pinned creation time, for ordering-sensitive tests.
pub fn scene_created_at(owner: OwnerId, name: &str, secs: u32) -> Scene {
    let created: DateTime<Utc> = Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, secs).unwrap();
    let mut scene = Scene::new(
        owner,
        format!("https://cdn.test/scenery/models/{name}"),
        format!("ast-{name}"),
        name,
    );
    scene.created_at = created;
    scene.updated_at = created;
    scene
}

/// Boundary string used by [`multipart_model_body`].
pub const BOUNDARY: &str = "----scenery-test-boundary";

/// Build a multipart/form-data body carrying one file field.
pub fn multipart_body(
    field: &str,
    filename: &str,
    content_type: &str,
    content: &[u8],
) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Body for the standard valid model upload.
pub fn multipart_model_body(filename: &str) -> Vec<u8> {
    multipart_body("model", filename, "application/octet-stream", GLB_SAMPLE)
}

/// Content-type header value matching [`multipart_body`].
pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

/// A multipart body with no file field at all.
pub fn multipart_empty_body() -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
