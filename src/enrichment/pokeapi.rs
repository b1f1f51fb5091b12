//! HTTP client for the public PokeAPI: detail enrichment and seed data.

use super::{build_details, EnrichmentDetails, EnrichmentError, EnrichmentSource, PokemonResponse, SpeciesResponse};
use crate::model::NewPokemon;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Pause between detail requests while seeding, to stay under the API rate limit.
const SEED_REQUEST_DELAY: Duration = Duration::from_millis(200);

#[derive(Clone)]
pub struct PokeApiClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ListResponse {
    results: Vec<ListEntry>,
}

#[derive(Deserialize)]
struct ListEntry {
    name: String,
    url: String,
}

#[derive(Deserialize)]
struct SeedPokemon {
    name: Option<String>,
    height: Option<i32>,
    weight: Option<i32>,
    #[serde(default)]
    sprites: Sprites,
}

#[derive(Default, Deserialize)]
struct Sprites {
    other: Option<OtherSprites>,
}

#[derive(Deserialize)]
struct OtherSprites {
    #[serde(rename = "official-artwork")]
    official_artwork: Option<Artwork>,
}

#[derive(Deserialize)]
struct Artwork {
    front_default: Option<String>,
}

impl PokeApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EnrichmentError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(PokeApiClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, EnrichmentError> {
        let resp = self.http.get(url).send().await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Err(EnrichmentError::NotFound(url.to_string())),
            s if !s.is_success() => Err(EnrichmentError::Status {
                status: s.as_u16(),
                url: url.to_string(),
            }),
            _ => Ok(resp.json::<T>().await?),
        }
    }

    /// Fetch the first `limit` catalog entries as seed records (no owner).
    /// Entries that fail to load or lack name, height or weight are skipped.
    pub async fn fetch_seed_batch(&self, limit: u32) -> Result<Vec<NewPokemon>, EnrichmentError> {
        let list: ListResponse = self
            .get_json(&format!("{}/pokemon?limit={}", self.base_url, limit))
            .await?;
        let mut out = Vec::with_capacity(list.results.len());
        for entry in list.results {
            match self.get_json::<SeedPokemon>(&entry.url).await {
                Ok(detail) => match seed_record(detail) {
                    Some(record) => {
                        tracing::debug!(name = %record.name, "fetched seed entry");
                        out.push(record);
                    }
                    None => tracing::warn!(url = %entry.url, "seed entry missing name, height or weight"),
                },
                Err(e) => tracing::warn!(name = %entry.name, error = %e, "failed to fetch seed entry"),
            }
            tokio::time::sleep(SEED_REQUEST_DELAY).await;
        }
        Ok(out)
    }
}

fn seed_record(detail: SeedPokemon) -> Option<NewPokemon> {
    let name = detail.name.filter(|n| !n.is_empty())?;
    let height = detail.height.filter(|h| *h > 0)?;
    let weight = detail.weight.filter(|w| *w > 0)?;
    let image = detail
        .sprites
        .other
        .and_then(|o| o.official_artwork)
        .and_then(|a| a.front_default);
    Some(NewPokemon {
        name,
        height,
        weight,
        image,
        owner_id: None,
    })
}

#[async_trait]
impl EnrichmentSource for PokeApiClient {
    async fn details(&self, name: &str) -> Result<EnrichmentDetails, EnrichmentError> {
        let key = name.trim().to_lowercase();
        let pokemon_url = format!("{}/pokemon/{}", self.base_url, key);
        let species_url = format!("{}/pokemon-species/{}", self.base_url, key);
        let (pokemon, species) = tokio::try_join!(
            self.get_json::<PokemonResponse>(&pokemon_url),
            self.get_json::<SpeciesResponse>(&species_url),
        )?;
        Ok(build_details(pokemon, species))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_record_takes_official_artwork() {
        let detail: SeedPokemon = serde_json::from_value(serde_json::json!({
            "name": "bulbasaur",
            "height": 7,
            "weight": 69,
            "sprites": {"other": {"official-artwork": {"front_default": "https://img/1.png"}}}
        }))
        .unwrap();
        let record = seed_record(detail).unwrap();
        assert_eq!(record.name, "bulbasaur");
        assert_eq!(record.image.as_deref(), Some("https://img/1.png"));
        assert_eq!(record.owner_id, None);
    }

    #[test]
    fn seed_record_requires_core_fields() {
        let detail: SeedPokemon = serde_json::from_value(serde_json::json!({"name": "missingno", "height": 10})).unwrap();
        assert!(seed_record(detail).is_none());
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        let c = PokeApiClient::new("https://pokeapi.co/api/v2/", Duration::from_secs(1)).unwrap();
        assert_eq!(c.base_url, "https://pokeapi.co/api/v2");
    }
}
