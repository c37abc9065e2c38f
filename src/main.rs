use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info, Level};

use promo_reel::{composition::ReelEngine, config::Config};

#[derive(Parser)]
#[command(
    name = "promo-reel",
    version,
    about = "Turn a folder of photos into a crossfaded promo video",
    long_about = "Promo-Reel cover-fits each image to the output resolution, encodes it as a short still clip, and chains the clips with crossfades into one video that ends on a branded title frame."
)]
struct Cli {
    /// Project root the configured paths are relative to
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the images directory
    #[arg(short, long)]
    images: Option<PathBuf>,

    /// Override the output video path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Image file name to use, in order (repeat for each image)
    #[arg(long = "order", value_name = "NAME")]
    order: Vec<String>,

    /// Write the effective configuration to this file and exit
    #[arg(long, value_name = "FILE")]
    dump_config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    info!("Starting Promo-Reel v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    if let Some(images) = cli.images {
        config.paths.images_dir = images;
    }
    if let Some(output) = cli.output {
        config.paths.output = output;
    }
    if !cli.order.is_empty() {
        config.order = cli.order;
    }

    if let Some(path) = cli.dump_config {
        config.save_to_file(&path)?;
        info!("Configuration written to {:?}", path);
        return Ok(());
    }

    let paths = config.resolve_paths(&cli.root);
    let engine = ReelEngine::new(config, paths);

    match engine.run().await {
        Ok(video) => {
            info!("Done! Video saved to: {}", video.path.display());
            Ok(())
        }
        Err(e) => {
            error!("{}", e.user_message());
            std::process::exit(1);
        }
    }
}
