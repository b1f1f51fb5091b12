//! pokedex-server: HTTP API over PostgreSQL.

use pokedex_service::auth::JwtConfig;
use pokedex_service::{
    app, apply_migrations, ensure_database_exists, AppState, CatalogService, ImageStore, PgStore,
    PokeApiClient, Settings,
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pokedex_service=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    ensure_database_exists(&settings.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.database_max_connections)
        .connect(&settings.database_url)
        .await?;
    apply_migrations(&pool).await?;

    let store = Arc::new(PgStore::new(pool));
    let enrichment = Arc::new(PokeApiClient::new(&settings.pokeapi_base_url, settings.pokeapi_timeout)?);
    let state = AppState {
        catalog: Arc::new(CatalogService::new(store.clone(), enrichment)),
        users: store,
        images: Arc::new(ImageStore::new(&settings.upload_dir, &settings.upload_public_prefix)),
        jwt: Arc::new(JwtConfig::from_settings(&settings)),
    };

    let router = app(state, settings.max_upload_bytes);
    let listener = TcpListener::bind(settings.bind_addr()).await?;
    tracing::info!("pokedex-server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
