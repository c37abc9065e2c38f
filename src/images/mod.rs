//! # Image Discovery Module
//!
//! Finds the still images in the input directory and puts them in playback order.

pub mod types;
pub mod resolver;

pub use types::{ImageAsset, OrderedImageSequence};
pub use resolver::ImageSetResolver;
