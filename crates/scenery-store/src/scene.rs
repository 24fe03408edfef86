//! Scene entity and supporting types
//!
//! Defines the sole persisted entity:
//! - Scene identifiers and owner identifiers
//! - Camera pose triples with their defaults
//! - The scene record itself

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Display name used when the uploaded filename yields nothing usable
pub const DEFAULT_SCENE_NAME: &str = "Untitled Scene";

/// Unique scene identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SceneId(pub Uuid);

impl SceneId {
    /// Generate new scene ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SceneId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SceneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SceneId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Identifier of the authenticated user owning a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub Uuid);

impl OwnerId {
    /// Generate new owner ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OwnerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Camera pose component (position or rotation)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Create new triple
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Default camera position
    #[inline]
    #[must_use]
    pub fn default_position() -> Self {
        Self::new(0.0, 0.0, 5.0)
    }

    /// Default camera rotation
    #[inline]
    #[must_use]
    pub fn default_rotation() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// A scene record
///
/// Pairs an externally hosted 3D model with saved camera state.
/// `owner` is set at creation and never reassigned; `model_url` and
/// `asset_id` are set once from the asset store's publish response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Scene identifier
    pub id: SceneId,
    /// Owning user
    pub owner: OwnerId,
    /// Externally resolvable URL to the model asset
    pub model_url: String,
    /// Opaque handle used to delete the remote asset
    pub asset_id: String,
    /// Display name
    pub name: String,
    /// Camera position (x, y, z)
    pub camera_position: Vec3,
    /// Camera rotation (x, y, z)
    pub camera_rotation: Vec3,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl Scene {
    /// Create a new scene from a publish result
    ///
    /// Camera state starts at the defaults; timestamps are set to now.
    #[must_use]
    pub fn new(
        owner: OwnerId,
        model_url: impl Into<String>,
        asset_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        let name = name.into();
        let name = name.trim().to_string();
        Self {
            id: SceneId::new(),
            owner,
            model_url: model_url.into(),
            asset_id: asset_id.into(),
            name: if name.is_empty() {
                DEFAULT_SCENE_NAME.to_string()
            } else {
                name
            },
            camera_position: Vec3::default_position(),
            camera_rotation: Vec3::default_rotation(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace both camera sub-objects together
    ///
    /// Refreshes `updated_at`; the change is not persisted until the
    /// record is saved through the store.
    pub fn set_camera_state(&mut self, position: Vec3, rotation: Vec3) {
        self.camera_position = position;
        self.camera_rotation = rotation;
        self.updated_at = Utc::now();
    }
}
