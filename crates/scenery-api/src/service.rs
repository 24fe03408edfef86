//! Scene service
//!
//! One method per operation, each a single transaction from the caller's
//! perspective: upload, list, get, delete, camera-state update. Ownership
//! is enforced here, not in the routes.
//!
//! Two lookup styles coexist on purpose: `get` folds the owner into the
//! query (a foreign scene reads as absent), while `delete` and
//! `update_camera` fetch by id alone and compare owners explicitly (a
//! foreign scene reads as unauthorized). Callers depend on both shapes.

use crate::error::ServiceError;
use crate::intake::StagedUpload;
use chrono::{DateTime, Utc};
use scenery_asset::ObjectStore;
use scenery_store::{OwnerId, Scene, SceneId, SceneRepo, Vec3};
use serde::Serialize;
use std::sync::Arc;

/// Response shape for a successful upload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    /// Generated scene id
    pub id: SceneId,
    /// URL answered by the asset store
    pub model_url: String,
    /// Display name derived from the uploaded filename
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Response shape for a camera-state update
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraStateReceipt {
    /// Scene id
    pub id: SceneId,
    /// New camera position
    pub camera_position: Vec3,
    /// New camera rotation
    pub camera_rotation: Vec3,
}

/// Orchestrates the record store and the asset gateway per operation.
pub struct SceneService {
    repo: Arc<dyn SceneRepo>,
    assets: Arc<dyn ObjectStore>,
}

impl SceneService {
    /// Create new service over the given store and gateway
    #[inline]
    #[must_use]
    pub fn new(repo: Arc<dyn SceneRepo>, assets: Arc<dyn ObjectStore>) -> Self {
        Self { repo, assets }
    }

    /// Publish a staged upload and create its scene record.
    ///
    /// Publish failure aborts the transaction; no partial record is
    /// created. The staged file is removed best-effort afterwards.
    pub async fn upload(
        &self,
        owner: OwnerId,
        staged: StagedUpload,
    ) -> Result<UploadReceipt, ServiceError> {
        let published = self
            .assets
            .publish(&staged.path, &staged.file_name)
            .await
            .map_err(|e| ServiceError::dependency("Error uploading model", e))?;

        let scene = Scene::new(owner, published.url, published.asset_id, &staged.file_name);
        self.repo
            .create(&scene)
            .await
            .map_err(|e| ServiceError::dependency("Error uploading model", e))?;

        if let Err(e) = tokio::fs::remove_file(&staged.path).await {
            tracing::warn!(staged = %staged.path.display(), error = %e, "staged file cleanup failed");
        }

        tracing::info!(scene = %scene.id, owner = %owner, "scene created");
        Ok(UploadReceipt {
            id: scene.id,
            model_url: scene.model_url,
            name: scene.name,
            created_at: scene.created_at,
        })
    }

    /// All of the caller's scenes, newest first.
    pub async fn list(&self, owner: OwnerId) -> Result<Vec<Scene>, ServiceError> {
        self.repo
            .list_by_owner(owner)
            .await
            .map_err(|e| ServiceError::dependency("Error fetching scenes", e))
    }

    /// A single scene, looked up with the owner folded into the query.
    ///
    /// A scene belonging to someone else answers 404, never 401.
    pub async fn get(&self, owner: OwnerId, id: SceneId) -> Result<Scene, ServiceError> {
        self.repo
            .find_for_owner(id, owner)
            .await
            .map_err(|e| ServiceError::dependency("Error fetching scene", e))?
            .ok_or_else(|| ServiceError::NotFound("Scene not found".to_string()))
    }

    /// Retract the remote asset and delete the record.
    ///
    /// The record is removed regardless of the retraction outcome; a
    /// failed retraction orphans the remote asset and still surfaces as
    /// a dependency failure. No compensation exists across the two
    /// systems.
    pub async fn delete(&self, owner: OwnerId, id: SceneId) -> Result<(), ServiceError> {
        let scene = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|e| ServiceError::dependency("Error deleting scene", e))?
            .ok_or_else(|| ServiceError::NotFound("Scene not found".to_string()))?;

        if scene.owner != owner {
            return Err(ServiceError::Unauthorized(
                "Not authorized to delete this scene".to_string(),
            ));
        }

        let retracted = self.assets.retract(&scene.asset_id).await;
        if let Err(e) = &retracted {
            tracing::error!(scene = %id, asset = %scene.asset_id, error = %e, "asset retraction failed");
        }

        self.repo
            .delete_by_id(id)
            .await
            .map_err(|e| ServiceError::dependency("Error deleting scene", e))?;

        retracted.map_err(|e| ServiceError::dependency("Error deleting scene", e))?;

        tracing::info!(scene = %id, "scene removed");
        Ok(())
    }

    /// Replace both camera sub-objects together and persist.
    pub async fn update_camera(
        &self,
        owner: OwnerId,
        id: SceneId,
        position: Vec3,
        rotation: Vec3,
    ) -> Result<CameraStateReceipt, ServiceError> {
        let mut scene = self
            .repo
            .find_by_id(id)
            .await
            .map_err(|e| ServiceError::dependency("Error updating camera state", e))?
            .ok_or_else(|| ServiceError::NotFound("Scene not found".to_string()))?;

        if scene.owner != owner {
            return Err(ServiceError::Unauthorized(
                "Not authorized to update this scene".to_string(),
            ));
        }

        scene.set_camera_state(position, rotation);
        self.repo
            .save(&scene)
            .await
            .map_err(|e| ServiceError::dependency("Error updating camera state", e))?;

        Ok(CameraStateReceipt {
            id: scene.id,
            camera_position: scene.camera_position,
            camera_rotation: scene.camera_rotation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;
    use pretty_assertions::assert_eq;
    use scenery_asset::{AssetError, PublishedAsset};
    use scenery_store::SqliteSceneStore;
    use std::path::Path;

    mock! {
        Assets {}

        #[async_trait::async_trait]
        impl ObjectStore for Assets {
            async fn publish(
                &self,
                file: &Path,
                original_name: &str,
            ) -> Result<PublishedAsset, AssetError>;

            async fn retract(&self, asset_id: &str) -> Result<(), AssetError>;
        }
    }

    async fn store() -> Arc<SqliteSceneStore> {
        Arc::new(SqliteSceneStore::in_memory().await.unwrap())
    }

    fn staged(dir: &tempfile::TempDir, name: &str) -> StagedUpload {
        let path = dir.path().join(name);
        std::fs::write(&path, b"glTF\x02\x00\x00\x00payload").unwrap();
        StagedUpload {
            path,
            file_name: name.to_string(),
            content_type: Some("model/gltf-binary".to_string()),
        }
    }

    async fn seeded_scene(repo: &Arc<SqliteSceneStore>, owner: OwnerId) -> Scene {
        let scene = Scene::new(owner, "https://cdn.test/chair.glb", "ast-chair", "chair.glb");
        repo.create(&scene).await.unwrap();
        scene
    }

    #[tokio::test]
    async fn upload_publishes_then_creates_record() {
        let repo = store().await;
        let dir = tempfile::tempdir().unwrap();

        let mut assets = MockAssets::new();
        assets.expect_publish().times(1).returning(|_, _| {
            Ok(PublishedAsset {
                url: "https://cdn.test/chair.glb".to_string(),
                asset_id: "ast-chair".to_string(),
            })
        });

        let service = SceneService::new(repo.clone(), Arc::new(assets));
        let owner = OwnerId::new();
        let upload = staged(&dir, "chair.glb");
        let staged_path = upload.path.clone();

        let receipt = service.upload(owner, upload).await.unwrap();

        assert_eq!(receipt.model_url, "https://cdn.test/chair.glb");
        assert_eq!(receipt.name, "chair.glb");

        let stored = repo.find_by_id(receipt.id).await.unwrap().unwrap();
        assert_eq!(stored.owner, owner);
        assert_eq!(stored.asset_id, "ast-chair");
        assert_eq!(stored.camera_position, Vec3::default_position());
        assert!(!staged_path.exists(), "staged file should be cleaned up");
    }

    #[tokio::test]
    async fn upload_failure_creates_no_record() {
        let repo = store().await;
        let dir = tempfile::tempdir().unwrap();

        let mut assets = MockAssets::new();
        assets
            .expect_publish()
            .times(1)
            .returning(|_, _| Err(AssetError::UploadFailed("quota".to_string())));

        let service = SceneService::new(repo.clone(), Arc::new(assets));
        let owner = OwnerId::new();

        let result = service.upload(owner, staged(&dir, "chair.glb")).await;
        assert!(matches!(result, Err(ServiceError::Dependency { .. })));
        assert!(repo.list_by_owner(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_treats_foreign_scene_as_absent() {
        let repo = store().await;
        let scene = seeded_scene(&repo, OwnerId::new()).await;

        let service = SceneService::new(repo, Arc::new(MockAssets::new()));
        let result = service.get(OwnerId::new(), scene.id).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_rejects_foreign_owner_without_touching_asset() {
        let repo = store().await;
        let scene = seeded_scene(&repo, OwnerId::new()).await;

        let mut assets = MockAssets::new();
        assets.expect_retract().times(0);

        let service = SceneService::new(repo.clone(), Arc::new(assets));
        let result = service.delete(OwnerId::new(), scene.id).await;

        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));
        assert!(repo.find_by_id(scene.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_retracts_then_removes_record() {
        let repo = store().await;
        let owner = OwnerId::new();
        let scene = seeded_scene(&repo, owner).await;

        let mut assets = MockAssets::new();
        assets
            .expect_retract()
            .withf(|asset_id| asset_id == "ast-chair")
            .times(1)
            .returning(|_| Ok(()));

        let service = SceneService::new(repo.clone(), Arc::new(assets));
        service.delete(owner, scene.id).await.unwrap();

        assert!(repo.find_by_id(scene.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_removes_record_even_when_retraction_fails() {
        let repo = store().await;
        let owner = OwnerId::new();
        let scene = seeded_scene(&repo, owner).await;

        let mut assets = MockAssets::new();
        assets
            .expect_retract()
            .times(1)
            .returning(|_| Err(AssetError::DeleteFailed("store down".to_string())));

        let service = SceneService::new(repo.clone(), Arc::new(assets));
        let result = service.delete(owner, scene.id).await;

        // Failure surfaces, but the record is already gone: the remote
        // asset is orphaned rather than the record resurrected.
        assert!(matches!(result, Err(ServiceError::Dependency { .. })));
        assert!(repo.find_by_id(scene.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_absent_scene_is_not_found() {
        let repo = store().await;
        let service = SceneService::new(repo, Arc::new(MockAssets::new()));

        let result = service.delete(OwnerId::new(), SceneId::new()).await;
        assert!(matches!(result, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_camera_rejects_foreign_owner_and_keeps_record() {
        let repo = store().await;
        let scene = seeded_scene(&repo, OwnerId::new()).await;

        let service = SceneService::new(repo.clone(), Arc::new(MockAssets::new()));
        let result = service
            .update_camera(
                OwnerId::new(),
                scene.id,
                Vec3::new(9.0, 9.0, 9.0),
                Vec3::new(1.0, 1.0, 1.0),
            )
            .await;

        assert!(matches!(result, Err(ServiceError::Unauthorized(_))));
        let stored = repo.find_by_id(scene.id).await.unwrap().unwrap();
        assert_eq!(stored.camera_position, Vec3::default_position());
    }

    #[tokio::test]
    async fn update_camera_replaces_both_and_persists() {
        let repo = store().await;
        let owner = OwnerId::new();
        let scene = seeded_scene(&repo, owner).await;

        let service = SceneService::new(repo.clone(), Arc::new(MockAssets::new()));
        let receipt = service
            .update_camera(
                owner,
                scene.id,
                Vec3::new(1.0, 2.0, 3.0),
                Vec3::new(0.0, 0.0, 0.0),
            )
            .await
            .unwrap();

        assert_eq!(receipt.camera_position, Vec3::new(1.0, 2.0, 3.0));

        let stored = repo.find_by_id(scene.id).await.unwrap().unwrap();
        assert_eq!(stored.camera_position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(stored.camera_rotation, Vec3::new(0.0, 0.0, 0.0));
    }
}
