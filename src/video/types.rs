use std::path::PathBuf;

/// One still image rendered as a fixed-length clip
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSegment {
    /// Path to the encoded clip
    pub path: PathBuf,

    /// Length in seconds, including the crossfade overlap
    pub duration: f64,

    /// Frame rate the clip was encoded at
    pub fps: u32,
}

/// Represents the final encoded video
#[derive(Debug, Clone)]
pub struct EncodedVideo {
    pub path: PathBuf,
    pub duration: f64,
    pub segment_count: usize,
    pub file_size: u64,
}
