//! PostgreSQL-backed stores using the SQL builder.

use super::{Page, RecordStore, UserStore};
use crate::error::StoreError;
use crate::model::{NavEntry, NewPokemon, NewUser, Pokemon, PokemonChanges, PokemonId, User};
use crate::service::query::ListQuery;
use crate::sql::{self, QueryBuf};
use async_trait::async_trait;
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn pokemon_query(q: &QueryBuf) -> sqlx::query::QueryAs<'_, sqlx::Postgres, Pokemon, sqlx::postgres::PgArguments> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    let mut query = sqlx::query_as::<_, Pokemon>(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

#[async_trait]
impl RecordStore for PgStore {
    async fn list_page(&self, query: &ListQuery) -> Result<Page, StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from_sqlx)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        let page_q = sql::select_page(query);
        let items = pokemon_query(&page_q)
            .fetch_all(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        let count_q = sql::count(&query.filters);
        tracing::debug!(sql = %count_q.sql, params = ?count_q.params, "query");
        let mut count = sqlx::query_scalar::<_, i64>(&count_q.sql);
        for p in &count_q.params {
            count = count.bind(p.clone());
        }
        let total = count.fetch_one(&mut *tx).await.map_err(StoreError::from_sqlx)?;
        tx.commit().await.map_err(StoreError::from_sqlx)?;

        Ok(Page {
            items,
            total_items: total.max(0) as u64,
        })
    }

    async fn find_by_id(&self, id: PokemonId) -> Result<Option<Pokemon>, StoreError> {
        let q = sql::select_by_id(id);
        pokemon_query(&q)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn insert(&self, input: &NewPokemon) -> Result<Pokemon, StoreError> {
        let q = sql::insert(input, false);
        pokemon_query(&q)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn insert_skip_duplicates(&self, inputs: &[NewPokemon]) -> Result<u64, StoreError> {
        let mut inserted = 0;
        let mut tx = self.pool.begin().await.map_err(StoreError::from_sqlx)?;
        for input in inputs {
            let q = sql::insert(input, true);
            let row = pokemon_query(&q)
                .fetch_optional(&mut *tx)
                .await
                .map_err(StoreError::from_sqlx)?;
            if row.is_some() {
                inserted += 1;
            }
        }
        tx.commit().await.map_err(StoreError::from_sqlx)?;
        Ok(inserted)
    }

    async fn update(&self, id: PokemonId, changes: &PokemonChanges) -> Result<Pokemon, StoreError> {
        let q = sql::update(id, changes);
        pokemon_query(&q)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?
            .ok_or(StoreError::RowMissing)
    }

    async fn delete(&self, id: PokemonId) -> Result<Pokemon, StoreError> {
        let q = sql::delete(id);
        pokemon_query(&q)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?
            .ok_or(StoreError::RowMissing)
    }

    async fn nav_index(&self) -> Result<Vec<NavEntry>, StoreError> {
        let q = sql::select_nav_index();
        tracing::debug!(sql = %q.sql, "query");
        sqlx::query_as::<_, NavEntry>(&q.sql)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .fetch_optional(&self.pool)
            .await
            .map(|_| ())
            .map_err(StoreError::from_sqlx)
    }
}

const USER_COLUMNS: &str = "id, email, name, password_hash, created_at";

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, input: &NewUser) -> Result<User, StoreError> {
        let query = format!(
            "INSERT INTO users (id, email, name, password_hash) VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(&input.email)
            .bind(&input.name)
            .bind(&input.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), StoreError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| StoreError::Unavailable(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await.map_err(StoreError::from_sqlx)?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await
        .map_err(StoreError::from_sqlx)?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await
            .map_err(StoreError::from_sqlx)?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), StoreError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| StoreError::Unavailable("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_database_name_from_url() {
        let (admin, name) = parse_db_name_from_url("postgres://u:p@localhost:5432/pokedex?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(name, "pokedex");
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("po\"ke"), "\"po\"\"ke\"");
    }
}
