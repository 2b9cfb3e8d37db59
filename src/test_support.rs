// Shared fixtures for the inline test suites: disposable databases,
// ready-made application state, and request builders for driving the
// router with tower's oneshot.

use crate::auth::TokenVerifier;
use crate::config::{AuthConfig, Config, DatabaseConfig, ServerConfig, UploadConfig};
use crate::models::AppState;
use crate::storage::FileStore;
use crate::types::{ApiError, AppResult};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use std::sync::Arc;
use tempfile::TempDir;

const BOUNDARY: &str = "test-boundary";

/// Verifier that resolves every credential to one fixed email, or
/// rejects everything.
pub struct StubVerifier {
    email: Option<String>,
}

impl StubVerifier {
    pub fn resolving(email: &str) -> Self {
        Self { email: Some(email.to_string()) }
    }

    pub fn rejecting() -> Self {
        Self { email: None }
    }
}

#[async_trait]
impl TokenVerifier for StubVerifier {
    async fn verify(&self, _credential: &str) -> AppResult<String> {
        self.email.clone().ok_or(ApiError::InvalidCredential)
    }
}

pub fn test_config(dir: &TempDir) -> Config {
    Config {
        server: ServerConfig {
            port: 5656,
            host: "127.0.0.1".to_string(),
            public_base_url: "http://localhost:5656".to_string(),
            cors_allowed_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: format!("sqlite:{}", dir.path().join("test.db").display()),
            max_connections: 5,
            min_connections: 1,
        },
        auth: AuthConfig {
            google_client_id: "client-id.apps.googleusercontent.com".to_string(),
            admin_email: "admin@example.com".to_string(),
            userinfo_url: "http://127.0.0.1:1/userinfo".to_string(),
            certs_url: "http://127.0.0.1:1/certs".to_string(),
        },
        uploads: UploadConfig {
            dir: dir.path().join("uploads"),
            require_category: false,
            max_upload_mb: 5,
        },
    }
}

/// Pool over a fresh tempfile-backed database with migrations applied.
pub async fn test_pool(dir: &TempDir) -> sqlx::SqlitePool {
    let config = DatabaseConfig {
        url: format!("sqlite:{}", dir.path().join("test.db").display()),
        max_connections: 5,
        min_connections: 1,
    };

    let pool = crate::db::create_pool(&config).await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

/// Application state over a disposable database and uploads directory.
/// The returned TempDir must stay alive as long as the state is used.
pub async fn test_state(verifier: StubVerifier) -> (AppState, TempDir) {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);

    let pool = test_pool(&dir).await;
    let files = FileStore::new(config.uploads.dir.clone());

    let state = AppState {
        pool,
        config,
        verifier: Arc::new(verifier),
        files,
    };

    (state, dir)
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Multipart POST to /upload_presentation carrying the given form
/// fields plus one file part.
pub fn upload_request(
    title: Option<&str>,
    category: Option<&str>,
    filename: &str,
    contents: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();

    if let Some(title) = title {
        push_text_part(&mut body, "title", title);
    }
    if let Some(category) = category {
        push_text_part(&mut body, "category", category);
    }

    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(b"\r\n");
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    multipart_request(body)
}

/// Like `upload_request`, but with no file part at all.
pub fn upload_request_without_file(title: Option<&str>, category: Option<&str>) -> Request<Body> {
    let mut body = Vec::new();

    if let Some(title) = title {
        push_text_part(&mut body, "title", title);
    }
    if let Some(category) = category {
        push_text_part(&mut body, "category", category);
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    multipart_request(body)
}

fn multipart_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload_presentation")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn push_text_part(body: &mut Vec<u8>, name: &str, value: &str) {
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
    );
    body.extend_from_slice(value.as_bytes());
    body.extend_from_slice(b"\r\n");
}

pub async fn body_bytes(response: Response) -> bytes::Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
