//! Pokedex service: a Pokemon catalog REST backend with PostgreSQL.

pub mod auth;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;
pub mod uploads;

pub use config::Settings;
pub use enrichment::{EnrichmentSource, PokeApiClient};
pub use error::{AppError, CatalogError, ConfigError, StoreError};
pub use migration::apply_migrations;
pub use routes::app;
pub use service::CatalogService;
pub use state::AppState;
pub use store::{ensure_database_exists, MemoryStore, PgStore, RecordStore, UserStore};
pub use uploads::ImageStore;
