//! Scene record store trait and SQLite implementation.

use crate::error::StoreError;
use crate::scene::{OwnerId, Scene, SceneId, Vec3};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Operations over scene records.
///
/// `find_for_owner` carries the owner predicate inside the query, so a
/// record belonging to someone else is indistinguishable from an absent
/// one. `find_by_id` fetches unconditionally; callers that need an
/// ownership check compare the owner field themselves.
#[async_trait]
pub trait SceneRepo: Send + Sync {
    /// Insert a new scene record.
    async fn create(&self, scene: &Scene) -> Result<(), StoreError>;

    /// Fetch a scene by id alone.
    async fn find_by_id(&self, id: SceneId) -> Result<Option<Scene>, StoreError>;

    /// Fetch a scene by id, restricted to the given owner.
    async fn find_for_owner(
        &self,
        id: SceneId,
        owner: OwnerId,
    ) -> Result<Option<Scene>, StoreError>;

    /// All scenes belonging to the owner, newest first.
    async fn list_by_owner(&self, owner: OwnerId) -> Result<Vec<Scene>, StoreError>;

    /// Delete a scene by id. Returns false when no row matched.
    async fn delete_by_id(&self, id: SceneId) -> Result<bool, StoreError>;

    /// Persist the mutable fields of an existing record.
    async fn save(&self, scene: &Scene) -> Result<(), StoreError>;
}

/// SQLite-backed scene store.
pub struct SqliteSceneStore {
    pool: Pool<Sqlite>,
}

impl SqliteSceneStore {
    /// Open (or create) a database file and run migrations.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // SQLite permits limited write concurrency; a single connection avoids
            // persistent "database is locked" failures under request concurrency.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Open a private in-memory database. Intended for tests.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            // The database lives and dies with its connection; never reap it.
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scenes (
                id            TEXT PRIMARY KEY,
                owner         TEXT NOT NULL,
                model_url     TEXT NOT NULL,
                asset_id      TEXT NOT NULL,
                name          TEXT NOT NULL,
                camera_pos_x  REAL NOT NULL,
                camera_pos_y  REAL NOT NULL,
                camera_pos_z  REAL NOT NULL,
                camera_rot_x  REAL NOT NULL,
                camera_rot_y  REAL NOT NULL,
                camera_rot_z  REAL NOT NULL,
                created_at    TEXT NOT NULL,
                updated_at    TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_scenes_owner_created
             ON scenes (owner, created_at DESC)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl SceneRepo for SqliteSceneStore {
    async fn create(&self, scene: &Scene) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO scenes (
                id, owner, model_url, asset_id, name,
                camera_pos_x, camera_pos_y, camera_pos_z,
                camera_rot_x, camera_rot_y, camera_rot_z,
                created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(scene.id.to_string())
        .bind(scene.owner.to_string())
        .bind(&scene.model_url)
        .bind(&scene.asset_id)
        .bind(&scene.name)
        .bind(scene.camera_position.x)
        .bind(scene.camera_position.y)
        .bind(scene.camera_position.z)
        .bind(scene.camera_rotation.x)
        .bind(scene.camera_rotation.y)
        .bind(scene.camera_rotation.z)
        .bind(scene.created_at)
        .bind(scene.updated_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(scene = %scene.id, owner = %scene.owner, "scene record created");
        Ok(())
    }

    async fn find_by_id(&self, id: SceneId) -> Result<Option<Scene>, StoreError> {
        let row: Option<SceneRow> =
            sqlx::query_as(&format!("{SELECT_SCENE} WHERE id = ?1"))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(Scene::try_from).transpose()
    }

    async fn find_for_owner(
        &self,
        id: SceneId,
        owner: OwnerId,
    ) -> Result<Option<Scene>, StoreError> {
        let row: Option<SceneRow> =
            sqlx::query_as(&format!("{SELECT_SCENE} WHERE id = ?1 AND owner = ?2"))
                .bind(id.to_string())
                .bind(owner.to_string())
                .fetch_optional(&self.pool)
                .await?;

        row.map(Scene::try_from).transpose()
    }

    async fn list_by_owner(&self, owner: OwnerId) -> Result<Vec<Scene>, StoreError> {
        let rows: Vec<SceneRow> = sqlx::query_as(&format!(
            "{SELECT_SCENE} WHERE owner = ?1 ORDER BY created_at DESC"
        ))
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Scene::try_from).collect()
    }

    async fn delete_by_id(&self, id: SceneId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM scenes WHERE id = ?1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn save(&self, scene: &Scene) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE scenes SET
                name = ?2,
                camera_pos_x = ?3, camera_pos_y = ?4, camera_pos_z = ?5,
                camera_rot_x = ?6, camera_rot_y = ?7, camera_rot_z = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(scene.id.to_string())
        .bind(&scene.name)
        .bind(scene.camera_position.x)
        .bind(scene.camera_position.y)
        .bind(scene.camera_position.z)
        .bind(scene.camera_rotation.x)
        .bind(scene.camera_rotation.y)
        .bind(scene.camera_rotation.z)
        .bind(scene.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

const SELECT_SCENE: &str = r#"
    SELECT id, owner, model_url, asset_id, name,
           camera_pos_x, camera_pos_y, camera_pos_z,
           camera_rot_x, camera_rot_y, camera_rot_z,
           created_at, updated_at
    FROM scenes
"#;

/// Raw row shape; converted into [`Scene`] after fetching.
#[derive(Debug, FromRow)]
struct SceneRow {
    id: String,
    owner: String,
    model_url: String,
    asset_id: String,
    name: String,
    camera_pos_x: f64,
    camera_pos_y: f64,
    camera_pos_z: f64,
    camera_rot_x: f64,
    camera_rot_y: f64,
    camera_rot_z: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SceneRow> for Scene {
    type Error = StoreError;

    fn try_from(row: SceneRow) -> Result<Self, Self::Error> {
        let id = row
            .id
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("scene id {:?}: {e}", row.id)))?;
        let owner = row
            .owner
            .parse()
            .map_err(|e| StoreError::Corrupt(format!("owner id {:?}: {e}", row.owner)))?;

        Ok(Scene {
            id,
            owner,
            model_url: row.model_url,
            asset_id: row.asset_id,
            name: row.name,
            camera_position: Vec3::new(row.camera_pos_x, row.camera_pos_y, row.camera_pos_z),
            camera_rotation: Vec3::new(row.camera_rot_x, row.camera_rot_y, row.camera_rot_z),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
