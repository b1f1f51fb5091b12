//! Catalog service: query building, ownership checks and payload validation around a record store.

mod authorization;
mod catalog;
pub mod query;
mod validation;

pub use authorization::{authorize, Access};
pub use catalog::{CatalogService, PokemonDetails};
pub use query::{ListQuery, ListRequest};
pub use validation::RequestValidator;
