//! Countdown appearance settings

use super::{CliArgs, EnvVars};
use crate::models::color::parse_rgb;
use std::path::PathBuf;

pub const DEFAULT_ASSET_DIR: &str = "/usr/share/christmas-countdown";

/// Settings for the countdown renderer, kept as given so validation can
/// report exactly what was wrong with them
#[derive(Clone, Debug)]
pub struct CountdownConfig {
    pub text_color: String,
    pub tree_color: String,
    pub tree_size: Option<i64>,
    pub asset_dir: PathBuf,
    pub update_interval_ms: u64,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            text_color: "255,0,0".to_string(),
            tree_color: "0,128,0".to_string(),
            tree_size: None,
            asset_dir: PathBuf::from(DEFAULT_ASSET_DIR),
            update_interval_ms: 1000,
        }
    }
}

impl CountdownConfig {
    /// Combine CLI arguments with environment overrides
    pub fn new(cli_args: &CliArgs, env_vars: &EnvVars) -> Self {
        let asset_dir = env_vars
            .asset_dir
            .clone()
            .or_else(|| cli_args.asset_dir.clone())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSET_DIR));

        Self {
            text_color: env_vars
                .text_color
                .clone()
                .unwrap_or_else(|| cli_args.text_color.clone()),
            tree_color: env_vars
                .tree_color
                .clone()
                .unwrap_or_else(|| cli_args.tree_color.clone()),
            tree_size: env_vars.tree_size.or(cli_args.tree_size),
            asset_dir,
            update_interval_ms: env_vars
                .update_interval_ms
                .unwrap_or(cli_args.update_interval_ms),
        }
    }

    /// Validate colors, tree size and update interval
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for (name, value) in [("text_color", &self.text_color), ("tree_color", &self.tree_color)] {
            if let Err(e) = parse_rgb(value) {
                errors.push(format!("Invalid {}: {}", name, e));
            }
        }

        if let Some(size) = self.tree_size {
            if size <= 0 || u32::try_from(size).is_err() {
                errors.push("tree_size must be a positive number".to_string());
            }
        }

        if self.update_interval_ms == 0 {
            errors.push("Update interval must be greater than 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
