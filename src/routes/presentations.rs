use axum::{
    Router,
    routing::{get, post},
    Json,
    extract::{Multipart, Path, Query, State},
    http::header,
    response::IntoResponse,
};
use crate::db::DatabaseOperations;
use crate::models::{
    file_url, AppState, AssignRequest, ListParams, MessageResponse, PresentationSummary,
    UploadResponse,
};
use crate::storage;
use crate::types::{ApiError, AppResult};
use tracing::debug;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/upload_presentation", post(upload_presentation))
        .route("/presentations", get(list_presentations))
        .route("/view_presentation/{id}", get(view_presentation))
        .route("/presentations/{id}/assign", post(assign_presentation))
        .route("/presentations/{id}/unassign", post(unassign_presentation))
        .with_state(state)
}

/// Validates the multipart form, stores the blob under its sanitized
/// filename, and inserts the catalog row. Same sanitized filename twice
/// means the second blob replaces the first.
async fn upload_presentation(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let mut title = None;
    let mut category = None;
    let mut file: Option<(String, bytes::Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_err)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => title = Some(field.text().await.map_err(multipart_err)?),
            "category" => category = Some(field.text().await.map_err(multipart_err)?),
            "file" => {
                let original_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(multipart_err)?;
                file = Some((original_name, data));
            }
            _ => {}
        }
    }

    let (original_name, data) = file.ok_or(ApiError::MissingField("file"))?;

    let title = title.unwrap_or_default();
    if title.is_empty() {
        return Err(ApiError::MissingField("title"));
    }

    let category = category.unwrap_or_default();
    if state.config.uploads.require_category && category.is_empty() {
        return Err(ApiError::MissingField("category"));
    }

    if !storage::allowed_file(&original_name) {
        return Err(ApiError::InvalidFileType);
    }
    let filename = storage::sanitize_filename(&original_name);

    debug!(
        "Presentation upload starting: {}, size={:.2} MB",
        filename,
        data.len() as f64 / (1024.0 * 1024.0)
    );

    let stored_path = state.files.save(&filename, &data).await?;

    let presentation = DatabaseOperations::create_presentation(
        &state.pool,
        &title,
        &category,
        &stored_path.to_string_lossy(),
    )
    .await?;

    debug!("Presentation upload finished: {}", filename);

    Ok(Json(UploadResponse {
        message: "File uploaded".to_string(),
        image_url: file_url(&state.config.server.public_base_url, presentation.file_name()),
    }))
}

async fn list_presentations(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<PresentationSummary>>> {
    let filter = params.q.unwrap_or_default();
    let rows = DatabaseOperations::list_presentations(&state.pool, &filter).await?;

    let base = &state.config.server.public_base_url;
    let summaries = rows.iter().map(|p| p.summary(base)).collect();

    Ok(Json(summaries))
}

/// Streams the stored file back. The view counter is bumped first, so
/// a view counts even when the blob has gone missing from disk.
async fn view_presentation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let presentation = DatabaseOperations::record_view(&state.pool, id).await?;
    debug!("Incremented views for presentation ID {}", id);

    let bytes = state.files.read(presentation.file_name()).await?;
    let content_type = mime_guess::from_path(presentation.file_name())
        .first_or_octet_stream()
        .to_string();

    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}

async fn assign_presentation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AssignRequest>,
) -> AppResult<Json<MessageResponse>> {
    let category = request.category.unwrap_or_default();
    if category.is_empty() {
        return Err(ApiError::MissingField("Category name"));
    }

    DatabaseOperations::assign_category(&state.pool, id, &category).await?;
    debug!("Presentation {} assigned to {}", id, category);

    Ok(Json(MessageResponse::new("Presentation assigned to category")))
}

async fn unassign_presentation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    DatabaseOperations::unassign_category(&state.pool, id).await?;
    debug!("Presentation {} unassigned from category.", id);

    Ok(Json(MessageResponse::new("Presentation unassigned from category")))
}

fn multipart_err(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::InvalidRequest(format!("Malformed multipart body: {}", e))
}
