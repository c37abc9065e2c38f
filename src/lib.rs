//! # Promo-Reel
//!
//! Assemble a short promotional video from a folder of still images: every
//! image is cover-fitted to the output resolution, held on screen for a fixed
//! time, crossfaded into the next one, and the reel closes on a generated
//! title frame with logo and caption.
//!
//! Encoding is delegated to an external `ffmpeg` binary.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use promo_reel::{composition::ReelEngine, config::Config};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! let paths = config.resolve_paths(".");
//!
//! let engine = ReelEngine::new(config, paths);
//! let video = engine.run().await?;
//! println!("{}", video.path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`images`] - Image discovery and ordering
//! - [`frame`] - Cover-fit normalization and the closing title frame
//! - [`video`] - Segment encoding and the crossfade merge
//! - [`composition`] - The pipeline and its scratch workspace
//! - [`config`] - Configuration management

pub mod composition;
pub mod config;
pub mod error;
pub mod frame;
pub mod images;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    composition::ReelEngine,
    config::Config,
    error::{ReelError, Result},
    video::{EncoderBackend, TransitionPlan},
};
