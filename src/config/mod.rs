//! Settings for the panel, the info server and the countdown itself

mod cli;
mod countdown;
mod display;
mod env;

pub use cli::CliArgs;
pub use countdown::{CountdownConfig, DEFAULT_ASSET_DIR};
pub use display::DisplayConfig;
pub use env::{load_env_vars, EnvVars};

/// Read flags and environment into one `DisplayConfig`. Environment wins.
pub fn init_config() -> Result<DisplayConfig, String> {
    DisplayConfig::new(CliArgs::parse(), load_env_vars())
}
