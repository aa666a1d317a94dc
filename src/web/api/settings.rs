use crate::models::settings::BrightnessSettings;
use crate::web::api::AppState;
use axum::extract::State;
use axum::Json;
use log::{debug, info};

pub async fn get_brightness(State(display): State<AppState>) -> Json<BrightnessSettings> {
    let display = display.lock().await;
    Json(BrightnessSettings {
        brightness: display.get_brightness(),
    })
}

/// Apply a new brightness and redraw with it on the next tick
pub async fn update_brightness(
    State(display): State<AppState>,
    Json(settings): Json<BrightnessSettings>,
) -> Json<BrightnessSettings> {
    let mut display = display.lock().await;

    let previous = display.get_brightness();
    display.set_brightness(settings.brightness);
    display.force_redraw();
    let current = display.get_brightness();

    // Sliders send many small steps, only log the big ones
    if current.abs_diff(previous) >= 10 || current == 0 || current == 100 {
        info!("Display brightness: {}% -> {}%", previous, current);
    } else {
        debug!("Display brightness: {}% -> {}%", previous, current);
    }

    Json(BrightnessSettings {
        brightness: current,
    })
}
