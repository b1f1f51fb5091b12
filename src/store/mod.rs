//! Record and identity persistence behind injectable traits.
//!
//! [`PgStore`] is the production implementation; [`MemoryStore`] keeps the same
//! contracts in process for tests and database-less local runs.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{ensure_database_exists, PgStore};

use crate::error::StoreError;
use crate::model::{NavEntry, NewPokemon, NewUser, Pokemon, PokemonChanges, PokemonId, User};
use crate::service::query::ListQuery;
use async_trait::async_trait;

/// Constraint names, shared by the DDL and the conflict mapping.
pub const UQ_POKEMON_NAME: &str = "uq_pokemon_name";
pub const UQ_USERS_EMAIL: &str = "uq_users_email";

/// One page of records and the total matching the same predicate, read from one snapshot.
#[derive(Clone, Debug)]
pub struct Page {
    pub items: Vec<Pokemon>,
    pub total_items: u64,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn list_page(&self, query: &ListQuery) -> Result<Page, StoreError>;

    async fn find_by_id(&self, id: PokemonId) -> Result<Option<Pokemon>, StoreError>;

    /// Fails with [`StoreError::UniqueViolation`] when the name is taken.
    async fn insert(&self, input: &NewPokemon) -> Result<Pokemon, StoreError>;

    /// Insert seed rows, silently skipping names that already exist. Returns the number inserted.
    async fn insert_skip_duplicates(&self, inputs: &[NewPokemon]) -> Result<u64, StoreError>;

    /// Fails with [`StoreError::RowMissing`] when the row vanished since it was read.
    async fn update(&self, id: PokemonId, changes: &PokemonChanges) -> Result<Pokemon, StoreError>;

    /// Returns the deleted row, or [`StoreError::RowMissing`].
    async fn delete(&self, id: PokemonId) -> Result<Pokemon, StoreError>;

    /// All `(id, name)` pairs ordered by ascending id.
    async fn nav_index(&self) -> Result<Vec<NavEntry>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`StoreError::UniqueViolation`] when the email is registered.
    async fn create_user(&self, input: &NewUser) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}
