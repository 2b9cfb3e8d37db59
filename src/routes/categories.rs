use axum::{
    Router,
    routing::{delete, get},
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use crate::db::DatabaseOperations;
use crate::models::{AppState, CreateCategoryRequest, MessageResponse};
use crate::types::{ApiError, AppResult};
use tracing::debug;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{name}", delete(delete_category))
        .with_state(state)
}

async fn list_categories(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    let names = DatabaseOperations::list_categories(&state.pool).await?;
    Ok(Json(names))
}

async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    let name = request.name.unwrap_or_default();
    if name.is_empty() {
        return Err(ApiError::MissingField("Category name"));
    }

    DatabaseOperations::create_category(&state.pool, &name).await?;
    debug!("Category created: {}", name);

    Ok((StatusCode::CREATED, Json(MessageResponse::new("Category created"))))
}

/// Unassigns every presentation carrying the category; the rows stay.
async fn delete_category(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let unassigned = DatabaseOperations::delete_category(&state.pool, &name).await?;
    debug!("Category {} deleted. {} presentations unassigned.", name, unassigned);

    Ok(Json(MessageResponse::new("Category deleted and presentations unassigned")))
}
