use crate::display::manager::DisplayManager;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

pub mod countdown;
pub mod display;
pub mod settings;

/// State shared by every handler
pub type AppState = Arc<tokio::sync::Mutex<DisplayManager>>;

/// All JSON endpoints of the info server
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/display/info", get(display::get_display_info))
        .route("/api/countdown/info", get(countdown::get_countdown_info))
        .route(
            "/api/settings/brightness",
            get(settings::get_brightness).put(settings::update_brightness),
        )
        .with_state(state)
}
