//! Idempotent DDL for the `users` and `pokemon` tables.

use crate::error::StoreError;
use crate::store::{UQ_POKEMON_NAME, UQ_USERS_EMAIL};
use sqlx::PgPool;

/// Statements in dependency order: `pokemon.owner_id` references `users.id`.
fn statements() -> Vec<String> {
    vec![
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT {} UNIQUE (email)
            )
            "#,
            UQ_USERS_EMAIL
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS pokemon (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                height INTEGER NOT NULL,
                weight INTEGER NOT NULL,
                image TEXT,
                owner_id TEXT REFERENCES users (id),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT {} UNIQUE (name)
            )
            "#,
            UQ_POKEMON_NAME
        ),
        "CREATE INDEX IF NOT EXISTS idx_pokemon_owner_id ON pokemon (owner_id)".to_string(),
    ]
}

/// Create tables, constraints and indexes if they do not exist yet.
pub async fn apply_migrations(pool: &PgPool) -> Result<(), StoreError> {
    for ddl in statements() {
        sqlx::query(&ddl).execute(pool).await.map_err(StoreError::from_sqlx)?;
    }
    tracing::info!("schema up to date");
    Ok(())
}
