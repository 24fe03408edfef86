//! Upload intake
//!
//! Accepts the multipart `model` field, filters on declared media type
//! and filename extension, and stages accepted content in a local
//! directory for handoff to the scene service. File content is never
//! parsed; malformed geometry is not a concern of this layer.

use crate::error::ServiceError;
use bytes::BufMut;
use chrono::Utc;
use futures::TryStreamExt;
use std::path::{Path, PathBuf};
use warp::multipart::{FormData, Part};

/// Upload size cap enforced by the transport before the handler runs
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Name of the multipart field carrying the model file
pub const MODEL_FIELD: &str = "model";

const INVALID_TYPE_MESSAGE: &str =
    "Invalid file type. Only GLB, GLTF, and OBJ files are allowed.";

/// A file accepted by intake and durably staged on local disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedUpload {
    /// Staged location of the content
    pub path: PathBuf,
    /// Filename as declared by the client
    pub file_name: String,
    /// Declared media type, if any
    pub content_type: Option<String>,
}

/// Whether a declared media type / filename pair names a supported model format.
///
/// Accepted: glTF JSON, glTF binary, generic octet-stream carrying a
/// `.glb`/`.gltf` file, or a `.obj` extension. Extension checks are
/// case-insensitive. This is a basic input filter, not a security
/// boundary.
#[must_use]
pub fn is_supported_model(file_name: &str, content_type: Option<&str>) -> bool {
    if matches!(content_type, Some("model/gltf+json") | Some("model/gltf-binary")) {
        return true;
    }
    if content_type == Some("application/octet-stream")
        && (has_extension(file_name, "glb") || has_extension(file_name, "gltf"))
    {
        return true;
    }
    has_extension(file_name, "obj")
}

fn has_extension(file_name: &str, ext: &str) -> bool {
    Path::new(file_name)
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Pull the `model` part out of a multipart form and stage it.
///
/// # Errors
/// - `Validation` when the field is missing, the form is malformed, or
///   the file type is not supported (no handler logic runs after this)
/// - `Dependency` when the staged file cannot be written
pub async fn stage(form: FormData, staging_dir: &Path) -> Result<StagedUpload, ServiceError> {
    let parts: Vec<Part> = form
        .try_collect()
        .await
        .map_err(|e| ServiceError::Validation(format!("Malformed upload: {e}")))?;

    let Some(part) = parts.into_iter().find(|p| p.name() == MODEL_FIELD) else {
        return Err(ServiceError::Validation("No file uploaded".to_string()));
    };

    let file_name = match part.filename() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(ServiceError::Validation(INVALID_TYPE_MESSAGE.to_string())),
    };
    let content_type = part.content_type().map(str::to_string);

    if !is_supported_model(&file_name, content_type.as_deref()) {
        return Err(ServiceError::Validation(INVALID_TYPE_MESSAGE.to_string()));
    }

    let content = part
        .stream()
        .try_fold(Vec::new(), |mut acc, data| {
            acc.put(data);
            async move { Ok(acc) }
        })
        .await
        .map_err(|e| ServiceError::Validation(format!("Malformed upload: {e}")))?;

    let path = staging_dir.join(staged_file_name(&file_name));
    tokio::fs::write(&path, &content)
        .await
        .map_err(|e| ServiceError::dependency("Error staging upload", e))?;

    tracing::debug!(file = %file_name, bytes = content.len(), staged = %path.display(), "upload staged");
    Ok(StagedUpload {
        path,
        file_name,
        content_type,
    })
}

/// Unique staging name: millisecond timestamp plus the client's basename.
fn staged_file_name(file_name: &str) -> String {
    let base = Path::new(file_name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    format!("{}-{}", Utc::now().timestamp_millis(), base)
}
