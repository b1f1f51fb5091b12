#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use pokedex_service::auth::{generate_access_token, JwtConfig};
use pokedex_service::enrichment::{EnrichmentDetails, EnrichmentError, EnrichmentSource};
use pokedex_service::model::NewPokemon;
use pokedex_service::{app, AppState, CatalogService, ImageStore, MemoryStore};

pub const UPLOAD_PREFIX: &str = "/uploads/pokemon";
pub const BOUNDARY: &str = "pokedex-test-boundary";

/// Enrichment source that either answers with fixed details or fails.
#[derive(Default)]
pub struct StubEnrichment {
    pub failing: AtomicBool,
}

impl StubEnrichment {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl EnrichmentSource for StubEnrichment {
    async fn details(&self, name: &str) -> Result<EnrichmentDetails, EnrichmentError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EnrichmentError::NotFound(name.to_string()));
        }
        Ok(EnrichmentDetails {
            pokedex_id: 25,
            description: format!("{} stores electricity in its cheeks.", name),
            category: "Mouse Pokémon".into(),
            types: vec!["electric".into()],
            abilities: vec![],
            stats: vec![],
            gender: "M: 50%, F: 50%".into(),
        })
    }
}

pub fn test_jwt() -> JwtConfig {
    JwtConfig {
        secret: "test-secret-that-is-long-enough".to_string(),
        access_token_expiry_mins: 15,
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub enrichment: Arc<StubEnrichment>,
    pub catalog: Arc<CatalogService>,
    pub jwt: JwtConfig,
    pub uploads: TempDir,
}

impl TestApp {
    pub fn token(&self, user_id: &str) -> String {
        generate_access_token(user_id, &format!("{user_id}@test.com"), &self.jwt).expect("token")
    }

    pub fn upload_path(&self, reference: &str) -> std::path::PathBuf {
        let file = reference.rsplit('/').next().expect("file name");
        self.uploads.path().join(file)
    }

    /// Insert seed (ownerless) records straight through the service.
    pub async fn seed(&self, names: &[&str]) {
        let entries: Vec<NewPokemon> = names
            .iter()
            .enumerate()
            .map(|(i, n)| NewPokemon {
                name: n.to_string(),
                height: 10 + i as i32,
                weight: 100 + i as i32,
                image: None,
                owner_id: None,
            })
            .collect();
        self.catalog.seed(&entries).await.expect("seed");
    }
}

pub fn build_test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let enrichment = Arc::new(StubEnrichment::default());
    let catalog = Arc::new(CatalogService::new(store.clone(), enrichment.clone()));
    let uploads = tempfile::tempdir().expect("tempdir");
    let jwt = test_jwt();
    let state = AppState {
        catalog: catalog.clone(),
        users: store.clone(),
        images: Arc::new(ImageStore::new(uploads.path(), UPLOAD_PREFIX)),
        jwt: Arc::new(jwt.clone()),
    };
    TestApp {
        router: app(state, 1024 * 1024),
        store,
        enrichment,
        catalog,
        jwt,
        uploads,
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("request should complete")
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, req).await
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let req = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

pub async fn delete_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    let req = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

/// One multipart part: a text field or a file.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
                );
            }
            Part::File(name, file_name, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn send_multipart(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    parts: &[Part<'_>],
) -> Response<Body> {
    let mut req = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"));
    if let Some(token) = token {
        req = req.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    send(app, req.body(Body::from(multipart_body(parts))).unwrap()).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    if bytes.is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

/// Create a record over HTTP as `user` and return its JSON.
pub async fn create_pokemon(app: &TestApp, user: &str, name: &str, height: &str, weight: &str) -> serde_json::Value {
    let token = app.token(user);
    let res = send_multipart(
        &app.router,
        Method::POST,
        "/pokemon",
        Some(&token),
        &[Part::Text("name", name), Part::Text("height", height), Part::Text("weight", weight)],
    )
    .await;
    assert_eq!(res.status(), axum::http::StatusCode::CREATED, "create {name}");
    body_json(res).await
}
