//! Catalog operations over an injected record store and enrichment source.

use crate::enrichment::{EnrichmentDetails, EnrichmentSource};
use crate::error::{CatalogError, StoreError};
use crate::model::{NavEntry, NewPokemon, Pokemon, PokemonChanges, PokemonDraft, PokemonId};
use crate::response::Paginated;
use crate::service::authorization::{authorize, Access};
use crate::service::query::{total_pages, ListQuery, ListRequest};
use crate::service::validation::RequestValidator;
use crate::store::RecordStore;
use serde::Serialize;
use std::sync::Arc;

/// A record merged with its best-effort enrichment (`null` when unavailable).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PokemonDetails {
    #[serde(flatten)]
    pub record: Pokemon,
    pub poke_api_details: Option<EnrichmentDetails>,
}

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn RecordStore>,
    enrichment: Arc<dyn EnrichmentSource>,
}

/// Translate a store failure into the catalog taxonomy.
fn map_store_error(err: StoreError, id: Option<PokemonId>) -> CatalogError {
    match err {
        StoreError::UniqueViolation { .. } => {
            CatalogError::Conflict("a pokemon with this name already exists".into())
        }
        StoreError::RowMissing => {
            CatalogError::NotFound(id.map(|i| i.to_string()).unwrap_or_default())
        }
        other => CatalogError::DataAccess(other.to_string()),
    }
}

impl CatalogService {
    pub fn new(store: Arc<dyn RecordStore>, enrichment: Arc<dyn EnrichmentSource>) -> Self {
        CatalogService { store, enrichment }
    }

    /// One page of records plus the totals needed to render pagination.
    pub async fn list(&self, req: ListRequest) -> Result<Paginated<Pokemon>, CatalogError> {
        let query = ListQuery::build(req)?;
        let page = self
            .store
            .list_page(&query)
            .await
            .map_err(|e| map_store_error(e, None))?;
        Ok(Paginated {
            data: page.items,
            total_items: page.total_items,
            current_page: query.page,
            total_pages: total_pages(page.total_items, query.limit),
            page_size: query.limit,
        })
    }

    pub async fn get_by_id(&self, id: PokemonId) -> Result<Pokemon, CatalogError> {
        self.store
            .find_by_id(id)
            .await
            .map_err(|e| map_store_error(e, Some(id)))?
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Record plus enrichment; enrichment failures are logged and yield `None`.
    pub async fn get_details(&self, id: PokemonId) -> Result<PokemonDetails, CatalogError> {
        let record = self.get_by_id(id).await?;
        let poke_api_details = match self.enrichment.details(&record.name).await {
            Ok(details) => Some(details),
            Err(e) => {
                tracing::warn!(id, name = %record.name, error = %e, "enrichment unavailable");
                None
            }
        };
        Ok(PokemonDetails {
            record,
            poke_api_details,
        })
    }

    pub async fn create(&self, mut draft: PokemonDraft, owner_id: &str) -> Result<Pokemon, CatalogError> {
        RequestValidator::validate_new(&mut draft)?;
        let input = draft.owned_by(Some(owner_id.to_string()));
        let record = self
            .store
            .insert(&input)
            .await
            .map_err(|e| map_store_error(e, None))?;
        tracing::info!(id = record.id, name = %record.name, owner = %owner_id, "pokemon created");
        Ok(record)
    }

    /// Partial update by the owner. A payload that changes nothing returns the stored record untouched.
    pub async fn update(
        &self,
        id: PokemonId,
        mut changes: PokemonChanges,
        identity: &str,
    ) -> Result<Pokemon, CatalogError> {
        let current = self.get_by_id(id).await?;
        if let Access::Denied(reason) = authorize(&current, identity) {
            tracing::info!(id, identity, %reason, "update denied");
            return Err(CatalogError::Forbidden(reason));
        }
        RequestValidator::validate_changes(&mut changes)?;
        let changes = changes.diff_against(&current);
        if changes.is_empty() {
            tracing::debug!(id, "update is a no-op");
            return Ok(current);
        }
        let record = self
            .store
            .update(id, &changes)
            .await
            .map_err(|e| map_store_error(e, Some(id)))?;
        tracing::info!(id, identity, "pokemon updated");
        Ok(record)
    }

    /// Delete by the owner. Returns the removed record so callers can clean up its image.
    pub async fn delete(&self, id: PokemonId, identity: &str) -> Result<Pokemon, CatalogError> {
        let current = self.get_by_id(id).await?;
        if let Access::Denied(reason) = authorize(&current, identity) {
            tracing::info!(id, identity, %reason, "delete denied");
            return Err(CatalogError::Forbidden(reason));
        }
        let record = self
            .store
            .delete(id)
            .await
            .map_err(|e| map_store_error(e, Some(id)))?;
        tracing::info!(id, identity, "pokemon deleted");
        Ok(record)
    }

    /// `(id, name)` pairs in ascending id order, for previous/next navigation.
    pub async fn list_id_and_name(&self) -> Result<Vec<NavEntry>, CatalogError> {
        self.store.nav_index().await.map_err(|e| map_store_error(e, None))
    }

    /// Insert ownerless seed records, skipping names already present.
    pub async fn seed(&self, entries: &[NewPokemon]) -> Result<u64, CatalogError> {
        let seeded: Vec<NewPokemon> = entries
            .iter()
            .cloned()
            .map(|e| NewPokemon { owner_id: None, ..e })
            .collect();
        let inserted = self
            .store
            .insert_skip_duplicates(&seeded)
            .await
            .map_err(|e| map_store_error(e, None))?;
        tracing::info!(inserted, offered = seeded.len(), "seed finished");
        Ok(inserted)
    }

    pub async fn ping(&self) -> Result<(), CatalogError> {
        self.store.ping().await.map_err(|e| map_store_error(e, None))
    }
}
