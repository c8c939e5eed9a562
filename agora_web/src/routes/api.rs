use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::state::AppState;

/// `GET /api/topics`: every topic with its post count, newest first
pub async fn list_topics(State(state): State<AppState>) -> Response {
    match state.forum.topics.list_with_post_counts().await {
        Ok(topics) => Json(topics).into_response(),
        Err(e) => {
            error!("Failed to fetch topics: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch topics" })),
            )
                .into_response()
        }
    }
}
