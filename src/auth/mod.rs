// Identity verification seam.
//
// The HTTP layer only talks to the TokenVerifier trait; the Google
// implementation lives in google.rs and tests substitute their own.

use crate::types::AppResult;
use async_trait::async_trait;

pub use google::GoogleVerifier;

pub mod google;

/// Resolves a bearer credential to the verified email it belongs to.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> AppResult<String>;
}
