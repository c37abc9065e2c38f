//! # Frame Module
//!
//! In-memory still frames: cover-fit normalization of photos and synthesis
//! of the closing title frame.

pub mod types;
pub mod normalizer;
pub mod composer;
pub mod font;

pub use types::Frame;
pub use normalizer::FrameNormalizer;
pub use composer::FrameComposer;
pub use font::CaptionFont;
