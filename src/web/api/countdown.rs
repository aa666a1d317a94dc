use axum::{extract::State, Json};

use crate::web::api::AppState;

/// Days remaining, the message on the panel and the countdown settings
pub async fn get_countdown_info(State(display): State<AppState>) -> Json<serde_json::Value> {
    let display_guard = display.lock().await;
    Json(display_guard.renderer_info())
}
