use crate::auth::TokenVerifier;
use crate::config::Config;
use crate::storage::FileStore;
use sqlx::SqlitePool;
use std::path::Path;
use std::sync::Arc;

/// Shared handles constructed once at startup and cloned into every
/// request handler. There is no other process-wide mutable state.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
    pub verifier: Arc<dyn TokenVerifier>,
    pub files: FileStore,
}

// Database rows
// Note: FromRow is needed for runtime query_as (without DATABASE_URL at compile time)

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
pub struct Presentation {
    pub id: i64,
    pub title: String,
    /// Plain label; empty string means uncategorized.
    pub category: String,
    pub upload_date: chrono::DateTime<chrono::Utc>,
    pub views: i64,
    pub file_path: String,
}

impl Presentation {
    /// Bare filename of the stored blob, without the uploads directory.
    pub fn file_name(&self) -> &str {
        Path::new(&self.file_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.file_path)
    }

    pub fn summary(&self, public_base_url: &str) -> PresentationSummary {
        PresentationSummary {
            id: self.id,
            title: self.title.clone(),
            category: self.category.clone(),
            views: self.views,
            upload_date: self.upload_date.format("%Y-%m-%d").to_string(),
            image_url: file_url(public_base_url, self.file_name()),
        }
    }
}

/// Absolute URL under this service's /uploads/ path for a stored file.
pub fn file_url(public_base_url: &str, file_name: &str) -> String {
    format!("{}/uploads/{}", public_base_url.trim_end_matches('/'), file_name)
}

// API request/response types

#[derive(Debug, serde::Deserialize)]
pub struct LoginRequest {
    pub token: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub email: String,
}

#[derive(Debug, serde::Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct UploadResponse {
    pub message: String,
    /// Kept as "image_url" for the existing frontend, even though it
    /// links decks and PDFs as well as images.
    pub image_url: String,
}

/// One row of GET /presentations.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PresentationSummary {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub views: i64,
    /// YYYY-MM-DD
    pub upload_date: String,
    pub image_url: String,
}

#[derive(Debug, serde::Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct AssignRequest {
    pub category: Option<String>,
}

#[derive(Debug, serde::Serialize)]
pub struct HeartbeatResponse {
    pub status: String,
}
