use crate::config::DisplayConfig;
use log::debug;
use std::any::Any;
use std::fmt::Debug;

pub mod memory;
mod options;
mod rpi_led_matrix_driver;
mod rpi_led_panel_driver;

pub use memory::{MemoryCanvas, MemoryDriver, MemoryDriverState};
pub use rpi_led_matrix_driver::RpiLedMatrixDriver;
pub use rpi_led_panel_driver::RpiLedPanelDriver;

/// A frame buffer the renderer draws into before the driver presents it
pub trait LedCanvas: Debug + Send {
    fn set_pixel(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8);
    fn fill(&mut self, r: u8, g: u8, b: u8);
    fn size(&self) -> (i32, i32); // (width, height)

    // Drivers recover their concrete canvas type through this
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

pub trait LedDriver: Debug + Send {
    fn initialize(config: &DisplayConfig) -> Result<Self, String>
    where
        Self: Sized;
    fn take_canvas(&mut self) -> Option<Box<dyn LedCanvas>>;
    /// Present `canvas` and hand back the buffer to draw the next frame into
    fn update_canvas(&mut self, canvas: Box<dyn LedCanvas>) -> Box<dyn LedCanvas>;
    fn shutdown(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverType {
    RpiLedPanel,  // Native Rust driver
    RpiLedMatrix, // C++ binding driver
    Memory,       // Headless, frames stay in memory
}

impl DriverType {
    /// Whether the driver touches GPIO and therefore needs root
    pub fn needs_hardware(self) -> bool {
        !matches!(self, DriverType::Memory)
    }
}

pub fn create_driver(config: &DisplayConfig) -> Result<Box<dyn LedDriver>, String> {
    match config.driver_type {
        DriverType::RpiLedPanel => {
            debug!("Creating rpi-led-panel driver");
            Ok(Box::new(RpiLedPanelDriver::initialize(config)?))
        }
        DriverType::RpiLedMatrix => {
            debug!("Creating rpi-led-matrix driver");
            Ok(Box::new(RpiLedMatrixDriver::initialize(config)?))
        }
        DriverType::Memory => {
            debug!("Creating in-memory driver");
            Ok(Box::new(MemoryDriver::initialize(config)?))
        }
    }
}
