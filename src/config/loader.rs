//! Environment loading. Every variable has a default except `JWT_SECRET`.

use crate::config::{validate, Settings};
use crate::error::ConfigError;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/pokedex";
pub const DEFAULT_UPLOAD_DIR: &str = "./public/uploads/pokemon";
pub const DEFAULT_UPLOAD_PUBLIC_PREFIX: &str = "/uploads/pokemon";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2";

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary lookup, then run cross-field validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let settings = Settings {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.into()),
            port: parse_or(&get, "PORT", DEFAULT_PORT)?,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            database_max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_secret: get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            jwt_access_expiry_mins: parse_or(&get, "JWT_ACCESS_EXPIRY_MINS", 60)?,
            upload_dir: get("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.into()),
            upload_public_prefix: get("UPLOAD_PUBLIC_PREFIX")
                .unwrap_or_else(|| DEFAULT_UPLOAD_PUBLIC_PREFIX.into()),
            max_upload_bytes: parse_or(&get, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            pokeapi_base_url: get("POKEAPI_BASE_URL").unwrap_or_else(|| DEFAULT_POKEAPI_BASE_URL.into()),
            pokeapi_timeout: Duration::from_secs(parse_or(&get, "POKEAPI_TIMEOUT_SECS", 10u64)?),
            seed_limit: parse_or(&get, "SEED_LIMIT", 50)?,
        };
        validate(&settings)?;
        Ok(settings)
    }
}

fn parse_or<G, T>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let s = Settings::from_lookup(lookup(&[("JWT_SECRET", "0123456789abcdef")])).unwrap();
        assert_eq!(s.port, 3000);
        assert_eq!(s.database_max_connections, 5);
        assert_eq!(s.upload_public_prefix, "/uploads/pokemon");
        assert_eq!(s.pokeapi_timeout, Duration::from_secs(10));
        assert_eq!(s.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn secret_is_required() {
        assert_matches!(Settings::from_lookup(lookup(&[])), Err(ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn non_numeric_port_is_invalid() {
        let r = Settings::from_lookup(lookup(&[("JWT_SECRET", "0123456789abcdef"), ("PORT", "http")]));
        assert_matches!(r, Err(ConfigError::Invalid { key: "PORT", .. }));
    }
}
