use axum::{extract::State, Json};
use serde::Serialize;

use crate::web::api::AppState;

#[derive(Serialize)]
pub struct DisplayInfoResponse {
    pub width: i32,
    pub height: i32,
    pub brightness: u8,
}

pub async fn get_display_info(State(display): State<AppState>) -> Json<DisplayInfoResponse> {
    let display_guard = display.lock().await;
    Json(DisplayInfoResponse {
        width: display_guard.display_width,
        height: display_guard.display_height,
        brightness: display_guard.get_brightness(),
    })
}
