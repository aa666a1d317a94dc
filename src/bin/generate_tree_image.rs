use argh::FromArgs;
use christmas_countdown::config::DEFAULT_ASSET_DIR;
use christmas_countdown::display::renderer::tree::default_tree;
use log::{error, info};
use std::path::PathBuf;

/// Render the built-in Christmas tree to a PNG the countdown can load
#[derive(FromArgs, Debug)]
struct GenerateArgs {
    /// edge length of the square image in pixels
    #[argh(option, default = "32")]
    size: u32,

    /// directory the `assets/christmas_tree.png` file is written under
    #[argh(option, default = "PathBuf::from(DEFAULT_ASSET_DIR)")]
    asset_dir: PathBuf,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: GenerateArgs = argh::from_env();
    if args.size == 0 {
        error!("Image size must be greater than 0");
        std::process::exit(1);
    }

    let assets_dir = args.asset_dir.join("assets");
    if let Err(e) = std::fs::create_dir_all(&assets_dir) {
        error!("Failed to create {}: {}", assets_dir.display(), e);
        std::process::exit(1);
    }

    let output_path = assets_dir.join("christmas_tree.png");
    if let Err(e) = default_tree(args.size).save(&output_path) {
        error!("Failed to write {}: {}", output_path.display(), e);
        std::process::exit(1);
    }

    info!("Created Christmas tree image at {}", output_path.display());
}
