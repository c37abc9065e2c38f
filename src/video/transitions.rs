//! Crossfade chaining.
//!
//! Timing lives in [`TransitionPlan`] and never touches strings. The plan is
//! turned into a typed [`FilterGraph`], which is only rendered to ffmpeg's
//! filtergraph syntax when the merge invocation is built.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::VideoConfig;
use crate::error::{EncodeError, Result};
use crate::video::backend::{path_arg, run_blocking, EncoderBackend, EncoderInvocation};
use crate::video::types::{EncodedVideo, VideoSegment};

/// One blend between the running result and segment `index`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossfade {
    /// Segment faded in, 1-based position in the timeline
    pub index: usize,

    /// Seconds into the assembled timeline where the fade starts
    pub offset: f64,

    /// Fade length in seconds
    pub duration: f64,
}

/// When each crossfade starts
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPlan {
    segment_count: usize,
    image_duration: f64,
    transition_duration: f64,
    crossfades: Vec<Crossfade>,
}

impl TransitionPlan {
    /// Plan `segment_count - 1` chained fades with `offset(i) = i * image - transition`.
    ///
    /// The transition has to be strictly shorter than the image duration,
    /// which keeps every offset positive and strictly increasing.
    pub fn new(segment_count: usize, image_duration: f64, transition_duration: f64) -> Result<Self> {
        if segment_count == 0 {
            return Err(EncodeError::InvalidPlan {
                details: "at least one segment is required".to_string(),
            }
            .into());
        }

        if !(image_duration > 0.0) {
            return Err(EncodeError::InvalidPlan {
                details: format!("image duration must be positive, got {}", image_duration),
            }
            .into());
        }

        if !(transition_duration >= 0.0) || transition_duration >= image_duration {
            return Err(EncodeError::InvalidPlan {
                details: format!(
                    "transition duration {} must be in [0, {})",
                    transition_duration, image_duration
                ),
            }
            .into());
        }

        let crossfades = (1..segment_count)
            .map(|index| Crossfade {
                index,
                offset: index as f64 * image_duration - transition_duration,
                duration: transition_duration,
            })
            .collect();

        Ok(Self {
            segment_count,
            image_duration,
            transition_duration,
            crossfades,
        })
    }

    pub fn from_config(segment_count: usize, video: &VideoConfig) -> Result<Self> {
        Self::new(segment_count, video.image_duration, video.transition_duration)
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn transition_duration(&self) -> f64 {
        self.transition_duration
    }

    pub fn crossfades(&self) -> &[Crossfade] {
        &self.crossfades
    }

    pub fn offsets(&self) -> Vec<f64> {
        self.crossfades.iter().map(|fade| fade.offset).collect()
    }

    /// Length of the merged video: the last fade starts at `(n-1)*image - t`
    /// and runs a full `image + t` segment from there.
    pub fn total_duration(&self) -> f64 {
        self.segment_count as f64 * self.image_duration
    }
}

/// A filter argument, either bare (`PTS-STARTPTS`) or named (`duration=0.5`)
#[derive(Debug, Clone, PartialEq)]
pub enum FilterArg {
    Positional(String),
    Named(String, String),
}

impl fmt::Display for FilterArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positional(value) => write!(f, "{}", value),
            Self::Named(key, value) => write!(f, "{}={}", key, value),
        }
    }
}

/// One filter with its input and output pad labels
#[derive(Debug, Clone, PartialEq)]
pub struct FilterNode {
    pub inputs: Vec<String>,
    pub filter: String,
    pub args: Vec<FilterArg>,
    pub output: String,
}

impl FilterNode {
    pub fn new<S: Into<String>>(filter: S) -> Self {
        Self {
            inputs: Vec::new(),
            filter: filter.into(),
            args: Vec::new(),
            output: String::new(),
        }
    }

    pub fn input<S: Into<String>>(mut self, label: S) -> Self {
        self.inputs.push(label.into());
        self
    }

    pub fn positional<S: Into<String>>(mut self, value: S) -> Self {
        self.args.push(FilterArg::Positional(value.into()));
        self
    }

    pub fn arg<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.args.push(FilterArg::Named(key.into(), value.into()));
        self
    }

    pub fn output<S: Into<String>>(mut self, label: S) -> Self {
        self.output = label.into();
        self
    }
}

impl fmt::Display for FilterNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for input in &self.inputs {
            write!(f, "[{}]", input)?;
        }
        write!(f, "{}", self.filter)?;
        for (i, arg) in self.args.iter().enumerate() {
            let separator = if i == 0 { '=' } else { ':' };
            write!(f, "{}{}", separator, arg)?;
        }
        write!(f, "[{}]", self.output)
    }
}

/// An ordered list of filter nodes plus the label mapped to the output file
#[derive(Debug, Clone, PartialEq)]
pub struct FilterGraph {
    nodes: Vec<FilterNode>,
    output: String,
}

impl FilterGraph {
    /// Reset every input's timestamps, then fold the inputs together with fades
    pub fn crossfade_chain(plan: &TransitionPlan) -> Self {
        let mut nodes: Vec<FilterNode> = (0..plan.segment_count())
            .map(|i| {
                FilterNode::new("setpts")
                    .input(format!("{}:v", i))
                    .positional("PTS-STARTPTS")
                    .output(format!("v{}in", i))
            })
            .collect();

        let mut current = "v0in".to_string();
        for fade in plan.crossfades() {
            let next = format!("v{}out", fade.index);
            nodes.push(
                FilterNode::new("xfade")
                    .input(current)
                    .input(format!("v{}in", fade.index))
                    .arg("transition", "fade")
                    .arg("duration", fade.duration.to_string())
                    .arg("offset", format!("{:.2}", fade.offset))
                    .output(next.clone()),
            );
            current = next;
        }

        Self { nodes, output: current }
    }

    pub fn nodes(&self) -> &[FilterNode] {
        &self.nodes
    }

    /// Label carrying the finished video
    pub fn output_label(&self) -> &str {
        &self.output
    }

    /// Render as a `-filter_complex` expression
    pub fn to_filter_complex(&self) -> String {
        self.nodes
            .iter()
            .map(|node| node.to_string())
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Merges all segments into the output file in one encoder pass
pub struct TransitionMerger {
    video: VideoConfig,
    backend: Arc<dyn EncoderBackend>,
}

impl TransitionMerger {
    pub fn new(video: VideoConfig, backend: Arc<dyn EncoderBackend>) -> Self {
        Self { video, backend }
    }

    pub fn invocation(&self, segments: &[VideoSegment], plan: &TransitionPlan, output: &Path) -> Result<EncoderInvocation> {
        if segments.len() != plan.segment_count() {
            return Err(EncodeError::InvalidPlan {
                details: format!(
                    "plan covers {} segments but {} were encoded",
                    plan.segment_count(),
                    segments.len()
                ),
            }
            .into());
        }

        let graph = FilterGraph::crossfade_chain(plan);

        let mut args = Vec::with_capacity(segments.len() * 2 + 10);
        for segment in segments {
            args.push("-i".to_string());
            args.push(path_arg(&segment.path));
        }
        args.extend([
            "-filter_complex".to_string(),
            graph.to_filter_complex(),
            "-map".to_string(),
            format!("[{}]", graph.output_label()),
            "-c:v".to_string(),
            self.video.codec.clone(),
            "-pix_fmt".to_string(),
            self.video.pixel_format.clone(),
            "-y".to_string(),
            path_arg(output),
        ]);

        Ok(EncoderInvocation::new("final merge", args, output.to_path_buf()))
    }

    /// Produce the final video, creating its parent directory first
    pub async fn merge(&self, segments: &[VideoSegment], plan: &TransitionPlan, output: &Path) -> Result<EncodedVideo> {
        let invocation = self.invocation(segments, plan, output)?;

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        info!("Creating video with smooth transitions: {:?}", output);
        info!("Transition duration: {}s", plan.transition_duration());

        run_blocking(&self.backend, invocation).await?;

        let file_size = std::fs::metadata(output)?.len();
        Ok(EncodedVideo {
            path: output.to_path_buf(),
            duration: plan.total_duration(),
            segment_count: segments.len(),
            file_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReelError;
    use crate::video::backend::FfmpegCli;
    use std::path::PathBuf;

    fn segments(n: usize) -> Vec<VideoSegment> {
        (0..n)
            .map(|i| VideoSegment {
                path: PathBuf::from(format!("/s/segment_{:04}.mp4", i)),
                duration: 3.5,
                fps: 30,
            })
            .collect()
    }

    #[test]
    fn test_reference_offsets() {
        let plan = TransitionPlan::new(5, 3.0, 0.5).unwrap();
        assert_eq!(plan.offsets(), vec![2.5, 5.5, 8.5, 11.5]);
        assert_eq!(plan.total_duration(), 15.0);
    }

    #[test]
    fn test_offsets_strictly_increasing() {
        for n in 2..12 {
            let plan = TransitionPlan::new(n, 2.25, 0.75).unwrap();
            let offsets = plan.offsets();
            assert_eq!(offsets.len(), n - 1);
            assert!(offsets[0] >= 0.0);
            for (i, pair) in offsets.windows(2).enumerate() {
                assert!(pair[0] < pair[1]);
                assert_eq!(pair[1], (i + 2) as f64 * 2.25 - 0.75);
            }
        }
    }

    #[test]
    fn test_rejects_transition_not_shorter_than_image() {
        assert!(matches!(
            TransitionPlan::new(3, 1.0, 1.0),
            Err(ReelError::Encode(EncodeError::InvalidPlan { .. }))
        ));
        assert!(TransitionPlan::new(3, 1.0, 2.0).is_err());
        assert!(TransitionPlan::new(3, 1.0, -0.1).is_err());
        assert!(TransitionPlan::new(0, 1.0, 0.5).is_err());
    }

    #[test]
    fn test_filter_complex_text() {
        let plan = TransitionPlan::new(3, 3.0, 0.5).unwrap();
        let graph = FilterGraph::crossfade_chain(&plan);

        assert_eq!(
            graph.to_filter_complex(),
            "[0:v]setpts=PTS-STARTPTS[v0in];\
             [1:v]setpts=PTS-STARTPTS[v1in];\
             [2:v]setpts=PTS-STARTPTS[v2in];\
             [v0in][v1in]xfade=transition=fade:duration=0.5:offset=2.50[v1out];\
             [v1out][v2in]xfade=transition=fade:duration=0.5:offset=5.50[v2out]"
        );
        assert_eq!(graph.output_label(), "v2out");
    }

    #[test]
    fn test_single_segment_graph_maps_input() {
        let plan = TransitionPlan::new(1, 3.0, 0.5).unwrap();
        let graph = FilterGraph::crossfade_chain(&plan);

        assert!(plan.crossfades().is_empty());
        assert_eq!(graph.to_filter_complex(), "[0:v]setpts=PTS-STARTPTS[v0in]");
        assert_eq!(graph.output_label(), "v0in");
    }

    #[test]
    fn test_merge_arguments() {
        let merger = TransitionMerger::new(VideoConfig::default(), Arc::new(FfmpegCli::default()));
        let plan = TransitionPlan::new(2, 3.0, 0.5).unwrap();
        let invocation = merger
            .invocation(&segments(2), &plan, Path::new("/out/homepage.mp4"))
            .unwrap();

        assert_eq!(
            invocation.args,
            vec![
                "-i", "/s/segment_0000.mp4",
                "-i", "/s/segment_0001.mp4",
                "-filter_complex",
                "[0:v]setpts=PTS-STARTPTS[v0in];[1:v]setpts=PTS-STARTPTS[v1in];[v0in][v1in]xfade=transition=fade:duration=0.5:offset=2.50[v1out]",
                "-map", "[v1out]",
                "-c:v", "libx264",
                "-pix_fmt", "yuv420p",
                "-y", "/out/homepage.mp4",
            ]
        );
    }

    #[test]
    fn test_merge_rejects_mismatched_segments() {
        let merger = TransitionMerger::new(VideoConfig::default(), Arc::new(FfmpegCli::default()));
        let plan = TransitionPlan::new(3, 3.0, 0.5).unwrap();
        assert!(merger.invocation(&segments(2), &plan, Path::new("o.mp4")).is_err());
    }
}
