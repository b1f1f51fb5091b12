//! Account registration and login.

use crate::auth::{generate_access_token, hash_password, verify_password};
use crate::error::{AppError, AppResult, CatalogError, StoreError};
use crate::model::{NewUser, UserInfo};
use crate::response::created;
use crate::service::RequestValidator;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Body of `POST /auth/register`. Fields are optional so that missing ones
/// produce a validation error rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Seconds.
    pub expires_in: i64,
    pub user: UserInfo,
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let email = input.email.unwrap_or_default().trim().to_lowercase();
    let password = input.password.unwrap_or_default();
    RequestValidator::validate_registration(&email, &password)?;

    let name = input
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| email.clone());
    let password_hash =
        hash_password(&password).map_err(|e| AppError::Internal(format!("password hashing error: {}", e)))?;

    let user = state
        .users
        .create_user(&NewUser {
            email,
            name,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StoreError::UniqueViolation { .. } => {
                AppError::Catalog(CatalogError::Conflict("an account with this email already exists".into()))
            }
            other => AppError::Catalog(CatalogError::DataAccess(other.to_string())),
        })?;
    tracing::info!(user_id = %user.id, "account registered");

    Ok(created(RegisterResponse {
        message: "user registered successfully",
        user: UserInfo::from(&user),
    }))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let email = input.email.unwrap_or_default().trim().to_lowercase();
    let password = input.password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(CatalogError::Validation {
            field: None,
            message: "email and password are required".into(),
        }
        .into());
    }

    let user = state
        .users
        .find_user_by_email(&email)
        .await
        .map_err(|e| AppError::Catalog(CatalogError::DataAccess(e.to_string())))?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.into()))?;

    let valid = verify_password(&password, &user.password_hash)
        .map_err(|e| AppError::Internal(format!("password verification error: {}", e)))?;
    if !valid {
        tracing::info!(user_id = %user.id, "login rejected");
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let access_token = generate_access_token(&user.id, &user.email, &state.jwt)
        .map_err(|e| AppError::Internal(format!("token generation error: {}", e)))?;
    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.jwt.expires_in(),
        user: UserInfo::from(&user),
    }))
}
