use axum::{Json, response::IntoResponse};

pub async fn ping() -> impl IntoResponse {
    Json(serde_json::json!({ "message": "pong" }))
}
