// Podium - web backend for uploading, cataloguing, and serving presentation decks

pub mod config;
pub mod db;
pub mod models;
pub mod types;
pub mod auth;      // Identity verification (Google access + ID tokens)
pub mod storage;   // Directory-backed blob store for uploads
pub mod routes;
pub mod middleware;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
