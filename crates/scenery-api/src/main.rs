use anyhow::Context;
use clap::{Arg, ArgMatches, Command};
use scenery_api::routes;
use scenery_api::{RemoteAuthenticator, SceneService, ServerConfig};
use scenery_asset::{AssetStoreConfig, HttpAssetStore, DEFAULT_FOLDER};
use scenery_store::SqliteSceneStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Command::new("scenery-api")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Scene storage API server")
        .arg(
            Arg::new("bind")
                .long("bind")
                .default_value("127.0.0.1:8080")
                .help("Socket address to listen on"),
        )
        .arg(
            Arg::new("database")
                .long("database")
                .default_value("scenery.db")
                .help("SQLite database file"),
        )
        .arg(
            Arg::new("staging-dir")
                .long("staging-dir")
                .default_value("uploads")
                .help("Directory uploads are staged in"),
        )
        .arg(
            Arg::new("asset-store-url")
                .long("asset-store-url")
                .help("Base URL of the object-store API (env: SCENERY_ASSET_STORE_URL)"),
        )
        .arg(
            Arg::new("asset-store-key")
                .long("asset-store-key")
                .help("Bearer credential for the object store (env: SCENERY_ASSET_STORE_KEY)"),
        )
        .arg(
            Arg::new("asset-folder")
                .long("asset-folder")
                .default_value(DEFAULT_FOLDER)
                .help("Namespace folder for published models"),
        )
        .arg(
            Arg::new("auth-url")
                .long("auth-url")
                .help("Base URL of the auth collaborator (env: SCENERY_AUTH_URL)"),
        );

    let matches = cli.get_matches();

    let asset_store_url = setting(&matches, "asset-store-url", "SCENERY_ASSET_STORE_URL")
        .context("--asset-store-url or SCENERY_ASSET_STORE_URL is required")?;
    let asset_store_key = setting(&matches, "asset-store-key", "SCENERY_ASSET_STORE_KEY")
        .context("--asset-store-key or SCENERY_ASSET_STORE_KEY is required")?;
    let auth_url = setting(&matches, "auth-url", "SCENERY_AUTH_URL")
        .context("--auth-url or SCENERY_AUTH_URL is required")?;

    let bind: SocketAddr = matches
        .get_one::<String>("bind")
        .expect("has default")
        .parse()
        .context("invalid --bind address")?;

    let asset_store = AssetStoreConfig::new(asset_store_url, asset_store_key)
        .with_folder(matches.get_one::<String>("asset-folder").expect("has default"));

    let config = ServerConfig::new(asset_store, auth_url)
        .with_bind(bind)
        .with_database(matches.get_one::<String>("database").expect("has default"))
        .with_staging_dir(matches.get_one::<String>("staging-dir").expect("has default"));

    tokio::fs::create_dir_all(&config.staging_dir)
        .await
        .with_context(|| format!("cannot create staging dir {:?}", config.staging_dir))?;

    let store = SqliteSceneStore::connect(&config.database_path)
        .await
        .context("cannot open scene database")?;

    let service = Arc::new(SceneService::new(
        Arc::new(store),
        Arc::new(HttpAssetStore::new(config.asset_store.clone())),
    ));
    let auth = Arc::new(RemoteAuthenticator::new(config.auth_url.clone()));

    let api = routes::api(service, auth, config.staging_dir.clone());

    tracing::info!(bind = %config.bind, database = %config.database_path.display(), "scenery api listening");
    warp::serve(api).run(config.bind).await;

    Ok(())
}

/// Flag value, falling back to the environment.
fn setting(matches: &ArgMatches, name: &str, env_key: &str) -> Option<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .or_else(|| std::env::var(env_key).ok())
}
