//! In-process store with the same uniqueness and snapshot guarantees as Postgres.

use super::{Page, RecordStore, UserStore, UQ_POKEMON_NAME, UQ_USERS_EMAIL};
use crate::error::StoreError;
use crate::model::{NavEntry, NewPokemon, NewUser, Pokemon, PokemonChanges, PokemonId, User};
use crate::service::query::{ListQuery, SortField, SortOrder};
use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Inner {
    next_id: PokemonId,
    pokemon: BTreeMap<PokemonId, Pokemon>,
    users: Vec<User>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable backend: every call fails with [`StoreError::Unavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::SeqCst);
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        if self.offline.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".into()))
    }
}

impl Inner {
    fn name_taken(&self, name: &str, except: Option<PokemonId>) -> bool {
        self.pokemon
            .values()
            .any(|p| p.name == name && Some(p.id) != except)
    }

    fn insert(&mut self, input: &NewPokemon) -> Pokemon {
        self.next_id += 1;
        let now = Utc::now();
        let record = Pokemon {
            id: self.next_id,
            name: input.name.clone(),
            height: input.height,
            weight: input.weight,
            image: input.image.clone(),
            owner_id: input.owner_id.clone(),
            created_at: now,
            updated_at: now,
        };
        self.pokemon.insert(record.id, record.clone());
        record
    }
}

fn compare(a: &Pokemon, b: &Pokemon, field: SortField) -> Ordering {
    match field {
        SortField::Name => a.name.cmp(&b.name),
        SortField::Height => a.height.cmp(&b.height),
        SortField::Weight => a.weight.cmp(&b.weight),
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_page(&self, query: &ListQuery) -> Result<Page, StoreError> {
        let inner = self.lock()?;
        // BTreeMap iteration is already id-ascending, the default order.
        let mut matching: Vec<&Pokemon> = inner
            .pokemon
            .values()
            .filter(|p| query.filters.matches(&p.name, p.height, p.weight))
            .collect();
        if let Some(sort) = query.sort {
            matching.sort_by(|a, b| {
                let ord = compare(a, b, sort.field);
                let ord = match sort.order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                };
                ord.then(a.id.cmp(&b.id))
            });
        }
        let total_items = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(query.limit as usize)
            .cloned()
            .collect();
        Ok(Page { items, total_items })
    }

    async fn find_by_id(&self, id: PokemonId) -> Result<Option<Pokemon>, StoreError> {
        Ok(self.lock()?.pokemon.get(&id).cloned())
    }

    async fn insert(&self, input: &NewPokemon) -> Result<Pokemon, StoreError> {
        let mut inner = self.lock()?;
        if inner.name_taken(&input.name, None) {
            return Err(StoreError::UniqueViolation {
                constraint: UQ_POKEMON_NAME.into(),
            });
        }
        Ok(inner.insert(input))
    }

    async fn insert_skip_duplicates(&self, inputs: &[NewPokemon]) -> Result<u64, StoreError> {
        let mut inner = self.lock()?;
        let mut inserted = 0;
        for input in inputs {
            if !inner.name_taken(&input.name, None) {
                inner.insert(input);
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn update(&self, id: PokemonId, changes: &PokemonChanges) -> Result<Pokemon, StoreError> {
        let mut inner = self.lock()?;
        if let Some(name) = &changes.name {
            if inner.name_taken(name, Some(id)) {
                return Err(StoreError::UniqueViolation {
                    constraint: UQ_POKEMON_NAME.into(),
                });
            }
        }
        let record = inner.pokemon.get_mut(&id).ok_or(StoreError::RowMissing)?;
        changes.apply_to(record);
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete(&self, id: PokemonId) -> Result<Pokemon, StoreError> {
        self.lock()?.pokemon.remove(&id).ok_or(StoreError::RowMissing)
    }

    async fn nav_index(&self) -> Result<Vec<NavEntry>, StoreError> {
        Ok(self
            .lock()?
            .pokemon
            .values()
            .map(|p| NavEntry {
                id: p.id,
                name: p.name.clone(),
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.lock().map(|_| ())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, input: &NewUser) -> Result<User, StoreError> {
        let mut inner = self.lock()?;
        if inner.users.iter().any(|u| u.email == input.email) {
            return Err(StoreError::UniqueViolation {
                constraint: UQ_USERS_EMAIL.into(),
            });
        }
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            email: input.email.clone(),
            name: input.name.clone(),
            password_hash: input.password_hash.clone(),
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.lock()?.users.iter().find(|u| u.email == email).cloned())
    }
}
