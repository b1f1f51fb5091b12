//! Catalog handlers: list, detail, navigation index, and owner-only mutations.

use crate::error::{AppError, AppResult, CatalogError};
use crate::extractors::AuthUser;
use crate::model::{Pokemon, PokemonChanges, PokemonDraft, PokemonId};
use crate::response::{created, ok};
use crate::service::query::Filters;
use crate::service::ListRequest;
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashMap;

fn parse_id(raw: &str) -> Result<PokemonId, AppError> {
    raw.trim()
        .parse::<PokemonId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::BadRequest(format!("invalid id: {}", raw)))
}

/// `page` / `limit` must be integers when given; their range is normalised later.
fn parse_paging(params: &HashMap<String, String>, key: &str) -> Result<Option<i64>, AppError> {
    match params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("{} must be a number", key))),
    }
}

/// Range filters that do not parse are treated as absent.
fn parse_bound(params: &HashMap<String, String>, key: &str) -> Option<i32> {
    params.get(key).and_then(|v| v.trim().parse::<i32>().ok())
}

fn list_request(params: &HashMap<String, String>) -> Result<ListRequest, AppError> {
    Ok(ListRequest {
        page: parse_paging(params, "page")?,
        limit: parse_paging(params, "limit")?,
        sort_by: params.get("sortBy").cloned(),
        sort_order: params.get("sortOrder").cloned().filter(|s| !s.is_empty()),
        filters: Filters {
            name: params.get("name").cloned(),
            min_height: parse_bound(params, "minHeight"),
            max_height: parse_bound(params, "maxHeight"),
            min_weight: parse_bound(params, "minWeight"),
            max_weight: parse_bound(params, "maxWeight"),
        },
    })
}

/// GET /pokemon
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<impl IntoResponse> {
    let req = list_request(&params)?;
    let page = state.catalog.list(req).await?;
    Ok(ok(page))
}

/// GET /pokemon/:id, enriched with `?view=details`.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> AppResult<Response> {
    let id = parse_id(&id)?;
    if params.get("view").map(String::as_str) == Some("details") {
        let details = state.catalog.get_details(id).await?;
        return Ok(Json(details).into_response());
    }
    let record = state.catalog.get_by_id(id).await?;
    Ok(Json(record).into_response())
}

/// GET /pokemon/list-for-nav
pub async fn list_for_nav(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let entries = state.catalog.list_id_and_name().await?;
    Ok(ok(entries))
}

/// Multipart fields shared by create and update.
#[derive(Default)]
struct PokemonForm {
    name: Option<String>,
    height: Option<String>,
    weight: Option<String>,
    image: Option<(String, Vec<u8>)>,
    remove_image: bool,
}

impl PokemonForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = PokemonForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "image" => {
                    let file_name = field.file_name().unwrap_or("image").to_string();
                    let data = field.bytes().await.map_err(|e| AppError::BadRequest(e.to_string()))?;
                    // empty file part means "no image supplied"
                    if !data.is_empty() {
                        form.image = Some((file_name, data.to_vec()));
                    }
                }
                "name" | "height" | "weight" | "removeImage" => {
                    let text = field.text().await.map_err(|e| AppError::BadRequest(e.to_string()))?;
                    match name.as_str() {
                        "name" => form.name = Some(text),
                        "height" => form.height = Some(text),
                        "weight" => form.weight = Some(text),
                        _ => form.remove_image = text.trim().eq_ignore_ascii_case("true"),
                    }
                }
                _ => {}
            }
        }
        Ok(form)
    }
}

fn parse_magnitude(field: &'static str, raw: &str) -> Result<i32, CatalogError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| CatalogError::validation(field, format!("{} must be a whole number", field)))
}

fn required(field: &'static str, value: Option<String>) -> Result<String, CatalogError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| CatalogError::validation(field, format!("{} is required", field)))
}

fn draft_from(form: &mut PokemonForm) -> Result<PokemonDraft, CatalogError> {
    let name = required("name", form.name.take())?;
    let height = parse_magnitude("height", &required("height", form.height.take())?)?;
    let weight = parse_magnitude("weight", &required("weight", form.weight.take())?)?;
    Ok(PokemonDraft {
        name,
        height,
        weight,
        image: None,
    })
}

/// Blank fields count as absent, so they leave the stored value unchanged.
fn changes_from(form: &mut PokemonForm) -> Result<PokemonChanges, CatalogError> {
    let height = match form.height.take().filter(|v| !v.trim().is_empty()) {
        Some(raw) => Some(parse_magnitude("height", &raw)?),
        None => None,
    };
    let weight = match form.weight.take().filter(|v| !v.trim().is_empty()) {
        Some(raw) => Some(parse_magnitude("weight", &raw)?),
        None => None,
    };
    Ok(PokemonChanges {
        name: form.name.take().filter(|v| !v.trim().is_empty()),
        height,
        weight,
        image: if form.remove_image { Some(None) } else { None },
    })
}

async fn store_upload(state: &AppState, upload: Option<(String, Vec<u8>)>) -> AppResult<Option<String>> {
    match upload {
        None => Ok(None),
        Some((file_name, data)) => state
            .images
            .save(&file_name, &data)
            .await
            .map(Some)
            .map_err(|e| AppError::Internal(format!("failed to store image: {}", e))),
    }
}

/// POST /pokemon (multipart)
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut form = PokemonForm::read(multipart).await?;
    let mut draft = draft_from(&mut form)?;
    draft.image = store_upload(&state, form.image.take()).await?;
    let stored = draft.image.clone();
    match state.catalog.create(draft, &user.user_id).await {
        Ok(record) => Ok(created(record)),
        Err(e) => {
            state.images.remove_if_managed(stored.as_deref()).await;
            Err(e.into())
        }
    }
}

/// PUT /pokemon/:id (multipart). A new image replaces the old one; `removeImage=true` clears it.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
    multipart: Multipart,
) -> AppResult<Json<Pokemon>> {
    let id = parse_id(&id)?;
    let mut form = PokemonForm::read(multipart).await?;
    let mut changes = changes_from(&mut form)?;

    let upload = form.image.take();
    let previous_image = if upload.is_some() || changes.image.is_some() {
        state.catalog.get_by_id(id).await?.image
    } else {
        None
    };
    let stored = store_upload(&state, upload).await?;
    if stored.is_some() {
        changes.image = Some(stored.clone());
    }

    match state.catalog.update(id, changes, &user.user_id).await {
        Ok(record) => {
            if previous_image.is_some() && previous_image != record.image {
                state.images.remove_if_managed(previous_image.as_deref()).await;
            }
            Ok(Json(record))
        }
        Err(e) => {
            state.images.remove_if_managed(stored.as_deref()).await;
            Err(e.into())
        }
    }
}

/// DELETE /pokemon/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    user: AuthUser,
) -> AppResult<StatusCode> {
    let id = parse_id(&id)?;
    let record = state.catalog.delete(id, &user.user_id).await?;
    state.images.remove_if_managed(record.image.as_deref()).await;
    Ok(StatusCode::NO_CONTENT)
}
