//! Field rules for catalog payloads and account registration.

use crate::error::CatalogError;
use crate::model::{PokemonChanges, PokemonDraft};

pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_MAGNITUDE: i32 = 1_000_000;
pub const MIN_PASSWORD_LENGTH: usize = 6;

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a full create payload. Trims the name in place.
    pub fn validate_new(input: &mut PokemonDraft) -> Result<(), CatalogError> {
        input.name = validate_name(&input.name)?;
        validate_magnitude("height", input.height)?;
        validate_magnitude("weight", input.weight)?;
        Ok(())
    }

    /// Validate only the fields present in a partial update.
    pub fn validate_changes(changes: &mut PokemonChanges) -> Result<(), CatalogError> {
        if let Some(name) = &changes.name {
            changes.name = Some(validate_name(name)?);
        }
        if let Some(h) = changes.height {
            validate_magnitude("height", h)?;
        }
        if let Some(w) = changes.weight {
            validate_magnitude("weight", w)?;
        }
        Ok(())
    }

    pub fn validate_registration(email: &str, password: &str) -> Result<(), CatalogError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(CatalogError::Validation {
                field: None,
                message: "email and password are required".into(),
            });
        }
        let email = email.trim();
        if !email.contains('@') || email.len() < 3 {
            return Err(CatalogError::validation("email", "email must be a valid email"));
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(CatalogError::validation(
                "password",
                format!("password must be at least {} characters long", MIN_PASSWORD_LENGTH),
            ));
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<String, CatalogError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::validation("name", "name is required"));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(CatalogError::validation(
            "name",
            format!("name must be at most {} characters", MAX_NAME_LENGTH),
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_magnitude(field: &'static str, v: i32) -> Result<(), CatalogError> {
    if v < 0 {
        return Err(CatalogError::validation(field, format!("{} must not be negative", field)));
    }
    if v > MAX_MAGNITUDE {
        return Err(CatalogError::validation(
            field,
            format!("{} must be at most {}", field, MAX_MAGNITUDE),
        ));
    }
    Ok(())
}
