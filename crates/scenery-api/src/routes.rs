//! HTTP surface
//!
//! The warp filter tree for the scene endpoints, the bearer-token auth
//! filter, and the rejection handler shaping every error as JSON
//! `{message, error?}` with the taxonomy's status code.

use crate::auth::{AuthError, Authenticator};
use crate::error::ServiceError;
use crate::intake::{self, MAX_UPLOAD_BYTES};
use crate::service::SceneService;
use scenery_store::{OwnerId, SceneId, Vec3};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::multipart::FormData;
use warp::{Filter, Rejection, Reply};

/// Complete filter tree with rejection handling applied.
pub fn api(
    service: Arc<SceneService>,
    auth: Arc<dyn Authenticator>,
    staging_dir: PathBuf,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    scene_routes(service, auth, staging_dir).recover(handle_rejection)
}

/// The five scene endpoints, before rejection handling.
pub fn scene_routes(
    service: Arc<SceneService>,
    auth: Arc<dyn Authenticator>,
    staging_dir: PathBuf,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    upload(service.clone(), auth.clone(), staging_dir)
        .or(list(service.clone(), auth.clone()))
        .or(get_one(service.clone(), auth.clone()))
        .or(delete_scene(service.clone(), auth.clone()))
        .or(save_state(service, auth))
}

/// POST /scene/upload
fn upload(
    service: Arc<SceneService>,
    auth: Arc<dyn Authenticator>,
    staging_dir: PathBuf,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("scene" / "upload")
        .and(warp::post())
        .and(authenticated(auth))
        .and(warp::multipart::form().max_length(MAX_UPLOAD_BYTES))
        .and(with_service(service))
        .and(warp::any().map(move || staging_dir.clone()))
        .and_then(upload_handler)
}

/// GET /scene
fn list(
    service: Arc<SceneService>,
    auth: Arc<dyn Authenticator>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("scene")
        .and(warp::get())
        .and(authenticated(auth))
        .and(with_service(service))
        .and_then(list_handler)
}

/// GET /scene/:id
fn get_one(
    service: Arc<SceneService>,
    auth: Arc<dyn Authenticator>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("scene" / SceneId)
        .and(warp::get())
        .and(authenticated(auth))
        .and(with_service(service))
        .and_then(get_handler)
}

/// DELETE /scene/:id
fn delete_scene(
    service: Arc<SceneService>,
    auth: Arc<dyn Authenticator>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("scene" / SceneId)
        .and(warp::delete())
        .and(authenticated(auth))
        .and(with_service(service))
        .and_then(delete_handler)
}

/// PUT /scene/:id/save-state
fn save_state(
    service: Arc<SceneService>,
    auth: Arc<dyn Authenticator>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("scene" / SceneId / "save-state")
        .and(warp::put())
        .and(authenticated(auth))
        .and(warp::body::content_length_limit(16 * 1024))
        .and(warp::body::json())
        .and(with_service(service))
        .and_then(save_state_handler)
}

fn with_service(
    service: Arc<SceneService>,
) -> impl Filter<Extract = (Arc<SceneService>,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

/// Resolves the caller identity from the `Authorization: Bearer` header.
fn authenticated(
    auth: Arc<dyn Authenticator>,
) -> impl Filter<Extract = (OwnerId,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization")
        .and(warp::any().map(move || auth.clone()))
        .and_then(resolve_owner)
}

async fn resolve_owner(
    header: Option<String>,
    auth: Arc<dyn Authenticator>,
) -> Result<OwnerId, Rejection> {
    let Some(token) = header.as_deref().and_then(|h| h.strip_prefix("Bearer ")) else {
        return Err(warp::reject::custom(ServiceError::Unauthorized(
            "Not authorized, no token".to_string(),
        )));
    };

    auth.authenticate(token).await.map_err(|e| {
        let message = match e {
            AuthError::Unavailable(_) => "Not authorized, token verification unavailable",
            _ => "Not authorized, token failed",
        };
        warp::reject::custom(ServiceError::Unauthorized(message.to_string()))
    })
}

async fn upload_handler(
    owner: OwnerId,
    form: FormData,
    service: Arc<SceneService>,
    staging_dir: PathBuf,
) -> Result<impl Reply, Rejection> {
    let staged = intake::stage(form, &staging_dir)
        .await
        .map_err(warp::reject::custom)?;
    let receipt = service
        .upload(owner, staged)
        .await
        .map_err(warp::reject::custom)?;

    Ok(warp::reply::with_status(
        warp::reply::json(&receipt),
        StatusCode::CREATED,
    ))
}

async fn list_handler(
    owner: OwnerId,
    service: Arc<SceneService>,
) -> Result<impl Reply, Rejection> {
    let scenes = service.list(owner).await.map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&scenes))
}

async fn get_handler(
    id: SceneId,
    owner: OwnerId,
    service: Arc<SceneService>,
) -> Result<impl Reply, Rejection> {
    let scene = service.get(owner, id).await.map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&scene))
}

async fn delete_handler(
    id: SceneId,
    owner: OwnerId,
    service: Arc<SceneService>,
) -> Result<impl Reply, Rejection> {
    service
        .delete(owner, id)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&serde_json::json!({
        "message": "Scene removed"
    })))
}

/// Body of PUT /scene/:id/save-state; both fields are required together.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveStateRequest {
    camera_position: Option<Vec3>,
    camera_rotation: Option<Vec3>,
}

async fn save_state_handler(
    id: SceneId,
    owner: OwnerId,
    body: SaveStateRequest,
    service: Arc<SceneService>,
) -> Result<impl Reply, Rejection> {
    let (Some(position), Some(rotation)) = (body.camera_position, body.camera_rotation) else {
        return Err(warp::reject::custom(ServiceError::Validation(
            "Camera position and rotation are required".to_string(),
        )));
    };

    let receipt = service
        .update_camera(owner, id, position, rotation)
        .await
        .map_err(warp::reject::custom)?;
    Ok(warp::reply::json(&receipt))
}

/// Error body shared by every failure response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Shape any rejection into the `{message, error?}` JSON body.
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message, detail) = if let Some(e) = err.find::<ServiceError>() {
        if matches!(e, ServiceError::Dependency { .. }) {
            tracing::error!(error = %e, "request failed");
        }
        (e.status(), e.message().to_string(), e.detail().map(String::from))
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_string(), None)
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            "File exceeds the 50 MiB upload limit".to_string(),
            None,
        )
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (
            StatusCode::BAD_REQUEST,
            "Invalid request body".to_string(),
            Some(e.to_string()),
        )
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
            None,
        )
    } else {
        tracing::error!(?err, "unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
            None,
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorBody {
            message,
            error: detail,
        }),
        status,
    ))
}
