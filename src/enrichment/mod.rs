//! Best-effort augmentation of a record with data from the public catalog API.
//!
//! A failure here never fails a detail request: the caller logs it and returns
//! the local record with `pokeApiDetails: null`.

mod pokeapi;

pub use pokeapi::PokeApiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Description fallback when no English flavor text exists.
pub const NO_DESCRIPTION: &str = "No description available.";
pub const UNKNOWN_CATEGORY: &str = "Unknown";
pub const GENDERLESS_RATE: i32 = -1;

/// Game versions whose flavor text is preferred, most preferred first.
pub const PREFERRED_DESCRIPTION_VERSIONS: &[&str] = &[
    "scarlet",
    "violet",
    "sword",
    "shield",
    "sun",
    "moon",
    "ultra-sun",
    "ultra-moon",
    "lets-go-pikachu",
    "lets-go-eevee",
    "x",
    "y",
    "omega-ruby",
    "alpha-sapphire",
];

const DESCRIPTION_LANGUAGE: &str = "en";

#[derive(Error, Debug)]
pub enum EnrichmentError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("no catalog entry for '{0}'")]
    NotFound(String),
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    pub is_hidden: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub name: String,
    pub base_stat: i32,
}

/// Supplementary attributes merged into the detail view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentDetails {
    pub pokedex_id: i64,
    pub description: String,
    pub category: String,
    pub types: Vec<String>,
    pub abilities: Vec<Ability>,
    pub stats: Vec<Stat>,
    pub gender: String,
}

#[async_trait]
pub trait EnrichmentSource: Send + Sync {
    async fn details(&self, name: &str) -> Result<EnrichmentDetails, EnrichmentError>;
}

#[derive(Clone, Debug, Deserialize)]
pub struct NamedResource {
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FlavorTextEntry {
    pub flavor_text: String,
    pub language: NamedResource,
    pub version: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Genus {
    pub genus: String,
    pub language: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SpeciesResponse {
    #[serde(default)]
    pub flavor_text_entries: Vec<FlavorTextEntry>,
    #[serde(default)]
    pub genera: Vec<Genus>,
    pub gender_rate: i32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub type_: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
    pub is_hidden: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StatSlot {
    pub base_stat: i32,
    pub stat: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PokemonResponse {
    pub id: i64,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
    #[serde(default)]
    pub stats: Vec<StatSlot>,
}

fn clean_flavor_text(s: &str) -> String {
    s.replace(['\u{c}', '\n'], " ")
}

/// Preferred version first, then the first English entry, then a placeholder.
pub fn select_description(entries: &[FlavorTextEntry]) -> String {
    let english: Vec<&FlavorTextEntry> = entries
        .iter()
        .filter(|e| e.language.name == DESCRIPTION_LANGUAGE)
        .collect();
    PREFERRED_DESCRIPTION_VERSIONS
        .iter()
        .find_map(|v| english.iter().find(|e| e.version.name == *v))
        .or_else(|| english.first())
        .map(|e| clean_flavor_text(&e.flavor_text))
        .unwrap_or_else(|| NO_DESCRIPTION.to_string())
}

pub fn select_category(genera: &[Genus]) -> String {
    genera
        .iter()
        .find(|g| g.language.name == DESCRIPTION_LANGUAGE)
        .map(|g| g.genus.clone())
        .filter(|g| !g.is_empty())
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
}

/// Gender split from the female rate in eighths; `-1` means genderless.
pub fn gender_label(rate: i32) -> String {
    if rate <= GENDERLESS_RATE {
        return "Genderless".to_string();
    }
    let female = f64::from(rate) / 8.0 * 100.0;
    let male = 100.0 - female;
    if female == 0.0 {
        "Male only".to_string()
    } else if male == 0.0 {
        "Female only".to_string()
    } else {
        format!("M: {}%, F: {}%", male, female)
    }
}

pub fn build_details(pokemon: PokemonResponse, species: SpeciesResponse) -> EnrichmentDetails {
    EnrichmentDetails {
        pokedex_id: pokemon.id,
        description: select_description(&species.flavor_text_entries),
        category: select_category(&species.genera),
        types: pokemon.types.into_iter().map(|t| t.type_.name).collect(),
        abilities: pokemon
            .abilities
            .into_iter()
            .map(|a| Ability {
                name: a.ability.name,
                is_hidden: a.is_hidden,
            })
            .collect(),
        stats: pokemon
            .stats
            .into_iter()
            .map(|s| Stat {
                name: s.stat.name,
                base_stat: s.base_stat,
            })
            .collect(),
        gender: gender_label(species.gender_rate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str, lang: &str, version: &str) -> FlavorTextEntry {
        FlavorTextEntry {
            flavor_text: text.into(),
            language: NamedResource { name: lang.into() },
            version: NamedResource { name: version.into() },
        }
    }

    #[test]
    fn gender_labels() {
        assert_eq!(gender_label(-1), "Genderless");
        assert_eq!(gender_label(0), "Male only");
        assert_eq!(gender_label(8), "Female only");
        assert_eq!(gender_label(4), "M: 50%, F: 50%");
        assert_eq!(gender_label(1), "M: 87.5%, F: 12.5%");
    }

    #[test]
    fn prefers_listed_versions_in_order() {
        let entries = vec![
            entry("red text", "en", "red"),
            entry("shield\u{c}text", "en", "shield"),
            entry("texte", "fr", "scarlet"),
            entry("sword\ntext", "en", "sword"),
        ];
        assert_eq!(select_description(&entries), "sword text");
    }

    #[test]
    fn falls_back_to_first_english_entry() {
        let entries = vec![entry("texte", "fr", "red"), entry("blue text", "en", "blue"), entry("red", "en", "red")];
        assert_eq!(select_description(&entries), "blue text");
    }

    #[test]
    fn placeholder_without_english_entries() {
        assert_eq!(select_description(&[entry("texte", "fr", "x")]), NO_DESCRIPTION);
        assert_eq!(select_description(&[]), NO_DESCRIPTION);
    }

    #[test]
    fn category_uses_english_genus() {
        let genera = vec![
            Genus {
                genus: "Maus-Pokémon".into(),
                language: NamedResource { name: "de".into() },
            },
            Genus {
                genus: "Mouse Pokémon".into(),
                language: NamedResource { name: "en".into() },
            },
        ];
        assert_eq!(select_category(&genera), "Mouse Pokémon");
        assert_eq!(select_category(&[]), UNKNOWN_CATEGORY);
    }

    #[test]
    fn builds_details_from_payloads() {
        let pokemon: PokemonResponse = serde_json::from_value(serde_json::json!({
            "id": 25,
            "types": [{"slot": 1, "type": {"name": "electric", "url": ""}}],
            "abilities": [{"ability": {"name": "static", "url": ""}, "is_hidden": false, "slot": 1}],
            "stats": [{"base_stat": 35, "effort": 0, "stat": {"name": "hp", "url": ""}}]
        }))
        .unwrap();
        let species: SpeciesResponse = serde_json::from_value(serde_json::json!({
            "flavor_text_entries": [],
            "genera": [],
            "gender_rate": 4
        }))
        .unwrap();
        let d = build_details(pokemon, species);
        assert_eq!(d.pokedex_id, 25);
        assert_eq!(d.types, vec!["electric"]);
        assert_eq!(d.abilities[0].name, "static");
        assert_eq!(d.stats[0].base_stat, 35);
        assert_eq!(d.gender, "M: 50%, F: 50%");
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["pokedexId"], 25);
        assert_eq!(v["abilities"][0]["is_hidden"], false);
    }
}
