//! # Video Module
//!
//! Everything that talks to the external encoder: per-image segments and
//! the crossfade merge into the final file.

pub mod types;
pub mod backend;
pub mod segment;
pub mod transitions;

pub use types::{EncodedVideo, VideoSegment};
pub use backend::{EncoderBackend, EncoderInvocation, FfmpegCli};
pub use segment::SegmentEncoder;
pub use transitions::{Crossfade, FilterGraph, FilterNode, TransitionMerger, TransitionPlan};
