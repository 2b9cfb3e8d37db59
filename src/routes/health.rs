use axum::{Router, routing::get, Json};
use crate::models::HeartbeatResponse;
use tracing::debug;

pub fn router() -> Router {
    Router::new()
        .route("/heartbeat", get(heartbeat))
}

async fn heartbeat() -> Json<HeartbeatResponse> {
    debug!("Heartbeat route called. Connection is alive.");

    Json(HeartbeatResponse {
        status: "alive".to_string(),
    })
}
