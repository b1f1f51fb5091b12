//! Shared application state for all routes.

use crate::auth::JwtConfig;
use crate::service::CatalogService;
use crate::store::UserStore;
use crate::uploads::ImageStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub users: Arc<dyn UserStore>,
    pub images: Arc<ImageStore>,
    pub jwt: Arc<JwtConfig>,
}
