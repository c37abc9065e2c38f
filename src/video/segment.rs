use std::path::Path;
use std::sync::Arc;

use crate::config::VideoConfig;
use crate::error::Result;
use crate::video::backend::{path_arg, run_blocking, EncoderBackend, EncoderInvocation};
use crate::video::types::VideoSegment;

/// Holds a single normalized frame on screen for a fixed time
pub struct SegmentEncoder {
    video: VideoConfig,
    backend: Arc<dyn EncoderBackend>,
}

impl SegmentEncoder {
    pub fn new(video: VideoConfig, backend: Arc<dyn EncoderBackend>) -> Self {
        Self { video, backend }
    }

    /// Arguments that loop `frame` for the segment duration at the output fps and size
    pub fn invocation(&self, stage: &str, frame: &Path, segment: &Path) -> EncoderInvocation {
        let video = &self.video;
        let args = vec![
            "-loop".to_string(),
            "1".to_string(),
            "-i".to_string(),
            path_arg(frame),
            "-t".to_string(),
            video.segment_duration().to_string(),
            "-vf".to_string(),
            format!("fps={},scale={}:{}", video.fps, video.width, video.height),
            "-c:v".to_string(),
            video.codec.clone(),
            "-pix_fmt".to_string(),
            video.pixel_format.clone(),
            "-y".to_string(),
            path_arg(segment),
        ];

        EncoderInvocation::new(stage, args, segment.to_path_buf())
    }

    /// Encode one segment; any encoder failure is returned as is
    pub async fn encode(&self, stage: &str, frame: &Path, segment: &Path) -> Result<VideoSegment> {
        run_blocking(&self.backend, self.invocation(stage, frame, segment)).await?;

        Ok(VideoSegment {
            path: segment.to_path_buf(),
            duration: self.video.segment_duration(),
            fps: self.video.fps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::backend::FfmpegCli;

    #[test]
    fn test_segment_arguments() {
        let encoder = SegmentEncoder::new(VideoConfig::default(), Arc::new(FfmpegCli::default()));
        let invocation = encoder.invocation(
            "segment 1/2",
            Path::new("/tmp/s/frame_0000.jpg"),
            Path::new("/tmp/s/segment_0000.mp4"),
        );

        assert_eq!(
            invocation.args,
            vec![
                "-loop", "1",
                "-i", "/tmp/s/frame_0000.jpg",
                "-t", "3.5",
                "-vf", "fps=30,scale=1920:1080",
                "-c:v", "libx264",
                "-pix_fmt", "yuv420p",
                "-y", "/tmp/s/segment_0000.mp4",
            ]
        );
        assert_eq!(invocation.output, Path::new("/tmp/s/segment_0000.mp4"));
    }

    #[test]
    fn test_segment_duration_follows_config() {
        let mut video = VideoConfig::default();
        video.image_duration = 4.0;
        video.transition_duration = 1.0;

        let encoder = SegmentEncoder::new(video, Arc::new(FfmpegCli::default()));
        let invocation = encoder.invocation("s", Path::new("f.jpg"), Path::new("s.mp4"));

        let t = invocation.args.iter().position(|a| a == "-t").unwrap();
        assert_eq!(invocation.args[t + 1], "5");
    }
}
