//! Cross-field checks on loaded settings.

use crate::config::Settings;
use crate::error::ConfigError;

pub const MIN_JWT_SECRET_BYTES: usize = 16;

pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.jwt_secret.len() < MIN_JWT_SECRET_BYTES {
        return Err(ConfigError::Validation(format!(
            "JWT_SECRET must be at least {} bytes",
            MIN_JWT_SECRET_BYTES
        )));
    }
    if settings.port == 0 {
        return Err(ConfigError::Validation("PORT must be non-zero".into()));
    }
    if settings.database_max_connections == 0 {
        return Err(ConfigError::Validation("DATABASE_MAX_CONNECTIONS must be non-zero".into()));
    }
    if settings.jwt_access_expiry_mins <= 0 {
        return Err(ConfigError::Validation("JWT_ACCESS_EXPIRY_MINS must be positive".into()));
    }
    let prefix = &settings.upload_public_prefix;
    if !prefix.starts_with('/') || prefix.trim_end_matches('/').is_empty() {
        return Err(ConfigError::Validation(format!(
            "UPLOAD_PUBLIC_PREFIX must be an absolute path below '/': {}",
            prefix
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn with(key: &str, value: &str) -> Result<Settings, ConfigError> {
        Settings::from_lookup(|k| match k {
            "JWT_SECRET" if key != "JWT_SECRET" => Some("0123456789abcdef".into()),
            k if k == key => Some(value.into()),
            _ => None,
        })
    }

    #[test]
    fn short_secret_rejected() {
        assert_matches!(with("JWT_SECRET", "short"), Err(ConfigError::Validation(_)));
    }

    #[test]
    fn prefix_must_be_absolute() {
        assert_matches!(with("UPLOAD_PUBLIC_PREFIX", "uploads"), Err(ConfigError::Validation(_)));
        assert_matches!(with("UPLOAD_PUBLIC_PREFIX", "/"), Err(ConfigError::Validation(_)));
        assert!(with("UPLOAD_PUBLIC_PREFIX", "/media").is_ok());
    }

    #[test]
    fn zero_pool_rejected() {
        assert_matches!(with("DATABASE_MAX_CONNECTIONS", "0"), Err(ConfigError::Validation(_)));
    }
}
