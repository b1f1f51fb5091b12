//! Process settings read from the environment (optionally seeded from `.env`).

pub mod loader;
pub mod validator;

pub use loader::*;
pub use validator::*;

use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_access_expiry_mins: i64,
    pub upload_dir: String,
    pub upload_public_prefix: String,
    pub max_upload_bytes: usize,
    pub pokeapi_base_url: String,
    pub pokeapi_timeout: Duration,
    pub seed_limit: u32,
}

impl Settings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
