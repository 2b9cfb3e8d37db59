use axum::{
    Router,
    routing::get,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use crate::models::AppState;
use crate::storage;
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/uploads/{filename}", get(serve_upload))
        .with_state(state)
}

/// Raw bytes of a stored blob. The requested name is sanitized the same
/// way upload names are, so a crafted path cannot reach outside the
/// uploads directory.
async fn serve_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<impl IntoResponse> {
    let name = storage::sanitize_filename(&filename);
    let bytes = state.files.read(&name).await?;

    let content_type = mime_guess::from_path(&name).first_or_octet_stream().to_string();
    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}
