use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone)]
pub struct BrightnessSettings {
    pub brightness: u8,
}
