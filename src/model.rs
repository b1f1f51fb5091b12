//! Catalog and identity records as stored and as returned to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned primary key of a catalog record.
pub type PokemonId = i64;

/// One catalog entry. `owner_id = None` marks seed data, which no identity may mutate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Pokemon {
    pub id: PokemonId,
    pub name: String,
    pub height: i32,
    pub weight: i32,
    pub image: Option<String>,
    pub owner_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Client-supplied fields of a record to create; the owner comes from the session.
#[derive(Clone, Debug, PartialEq)]
pub struct PokemonDraft {
    pub name: String,
    pub height: i32,
    pub weight: i32,
    pub image: Option<String>,
}

impl PokemonDraft {
    pub fn owned_by(self, owner_id: Option<String>) -> NewPokemon {
        NewPokemon {
            name: self.name,
            height: self.height,
            weight: self.weight,
            image: self.image,
            owner_id,
        }
    }
}

/// Data required to insert a new [`Pokemon`].
#[derive(Clone, Debug, PartialEq)]
pub struct NewPokemon {
    pub name: String,
    pub height: i32,
    pub weight: i32,
    pub image: Option<String>,
    pub owner_id: Option<String>,
}

/// Partial update. `None` leaves a field unchanged; `image: Some(None)` clears the image.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PokemonChanges {
    pub name: Option<String>,
    pub height: Option<i32>,
    pub weight: Option<i32>,
    pub image: Option<Option<String>>,
}

impl PokemonChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.height.is_none() && self.weight.is_none() && self.image.is_none()
    }

    /// Drop every field whose value already matches `current`.
    pub fn diff_against(self, current: &Pokemon) -> PokemonChanges {
        PokemonChanges {
            name: self.name.filter(|n| *n != current.name),
            height: self.height.filter(|h| *h != current.height),
            weight: self.weight.filter(|w| *w != current.weight),
            image: self.image.filter(|i| *i != current.image),
        }
    }

    /// Apply onto an existing record (used by the in-memory store).
    pub fn apply_to(&self, record: &mut Pokemon) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(height) = self.height {
            record.height = height;
        }
        if let Some(weight) = self.weight {
            record.weight = weight;
        }
        if let Some(image) = &self.image {
            record.image = image.clone();
        }
    }
}

/// Entry of the lightweight previous/next navigation index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct NavEntry {
    pub id: PokemonId,
    pub name: String,
}

/// A registered identity. `password_hash` is an Argon2id PHC string and never serialized.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

/// Public view of a [`User`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserInfo {
    fn from(u: &User) -> Self {
        UserInfo {
            id: u.id.clone(),
            email: u.email.clone(),
            name: u.name.clone(),
            created_at: u.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Pokemon {
        let now = Utc::now();
        Pokemon {
            id: 1,
            name: "pikachu".into(),
            height: 4,
            weight: 60,
            image: Some("/uploads/pokemon/a.png".into()),
            owner_id: Some("u1".into()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn diff_keeps_only_changed_fields() {
        let changes = PokemonChanges {
            name: Some("pikachu".into()),
            height: Some(5),
            weight: None,
            image: Some(None),
        };
        let diff = changes.diff_against(&sample());
        assert_eq!(diff.name, None);
        assert_eq!(diff.height, Some(5));
        assert_eq!(diff.image, Some(None));
    }

    #[test]
    fn identical_payload_diffs_to_empty() {
        let p = sample();
        let changes = PokemonChanges {
            name: Some(p.name.clone()),
            height: Some(p.height),
            weight: Some(p.weight),
            image: Some(p.image.clone()),
        };
        assert!(changes.diff_against(&p).is_empty());
    }

    #[test]
    fn serializes_owner_as_camel_case() {
        let v = serde_json::to_value(sample()).unwrap();
        assert_eq!(v["ownerId"], "u1");
        assert!(v.get("createdAt").is_some());
    }
}
