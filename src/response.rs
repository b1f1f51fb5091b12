//! Response envelopes.

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Paginated list envelope: `{ data, totalItems, currentPage, totalPages, pageSize }`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total_items: u64,
    pub current_page: u32,
    pub total_pages: u64,
    pub page_size: u32,
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(data))
}

pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<T>) {
    (StatusCode::OK, Json(data))
}
