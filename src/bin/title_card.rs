// Render only the closing title frame, for checking logo and caption layout
// without running the encoder.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use promo_reel::{config::Config, frame::FrameComposer};

#[derive(Parser)]
#[command(name = "title_card", about = "Render the closing title frame to an image")]
struct Cli {
    /// Project root the configured logo path is relative to
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the frame
    #[arg(short, long, default_value = "title_card.jpg")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt().init();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.validate()?;

    let paths = config.resolve_paths(&cli.root);
    let video = &config.video;
    let composer = FrameComposer::new(config.title.clone(), video.width, video.height);

    let frame = composer.compose(Some(&paths.logo));
    frame.save_jpeg(&cli.output, video.frame_quality)?;

    info!("Title frame {}x{} written to {:?}", frame.width(), frame.height(), cli.output);
    Ok(())
}
