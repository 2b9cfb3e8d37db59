use axum::{
    Router,
    routing::post,
    Json,
    extract::State,
};
use crate::db::DatabaseOperations;
use crate::models::{AppState, LoginRequest, LoginResponse};
use crate::types::{ApiError, AppResult};
use tracing::{debug, warn};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/admin/login", post(admin_login))
        .with_state(state)
}

/// Verifies the posted credential and lets exactly one email through.
/// A credential that verifies to anyone else is a 403, not a 400.
async fn admin_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let token = request.token.ok_or(ApiError::InvalidCredential)?;
    let email = state.verifier.verify(&token).await?;

    if email != state.config.auth.admin_email {
        warn!(%email, "login rejected: verified email is not the admin");
        return Err(ApiError::Unauthorized);
    }

    DatabaseOperations::get_or_create_user(&state.pool, &email).await?;

    debug!("Admin {} logged in.", email);
    Ok(Json(LoginResponse {
        message: "Admin logged in".to_string(),
        email,
    }))
}
