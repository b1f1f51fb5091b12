//! HTTP handlers for the catalog and for accounts.

pub mod auth;
pub mod pokemon;
