//! pokedex-seed: load the first `SEED_LIMIT` catalog entries as ownerless records.

use pokedex_service::{
    apply_migrations, ensure_database_exists, CatalogService, PgStore, PokeApiClient, Settings,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pokedex_service=info")),
        )
        .init();

    let settings = Settings::from_env()?;
    ensure_database_exists(&settings.database_url).await?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.database_max_connections)
        .connect(&settings.database_url)
        .await?;
    apply_migrations(&pool).await?;

    let client = Arc::new(PokeApiClient::new(&settings.pokeapi_base_url, settings.pokeapi_timeout)?);
    let catalog = CatalogService::new(Arc::new(PgStore::new(pool)), client.clone());

    tracing::info!(limit = settings.seed_limit, "fetching seed entries");
    let entries = client.fetch_seed_batch(settings.seed_limit).await?;
    let inserted = catalog.seed(&entries).await?;
    tracing::info!(fetched = entries.len(), inserted, "seeding complete");
    Ok(())
}
