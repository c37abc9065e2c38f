//! # Composition Engine
//!
//! The engine sequences image resolution, frame preparation, segment
//! encoding and the crossfade merge inside one scratch workspace.

pub mod engine;
pub mod workspace;

// Re-exports for convenience
pub use engine::{ReelEngine, RunStage};
pub use workspace::ScratchWorkspace;
