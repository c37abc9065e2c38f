use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::{
    composition::workspace::ScratchWorkspace,
    config::{Config, ReelPaths},
    error::Result,
    frame::{Frame, FrameComposer, FrameNormalizer},
    images::{ImageSetResolver, OrderedImageSequence},
    video::{
        EncodedVideo, EncoderBackend, FfmpegCli, SegmentEncoder, TransitionMerger,
        TransitionPlan, VideoSegment,
    },
};

/// Linear progress of one run; a failure at any stage jumps to cleanup
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunStage {
    Init,
    Resolved,
    Composed,
    Normalized,
    Encoded,
    Merged,
    CleanedUp,
    Done,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Resolved => "resolved",
            Self::Composed => "composed",
            Self::Normalized => "normalized",
            Self::Encoded => "encoded",
            Self::Merged => "merged",
            Self::CleanedUp => "cleaned up",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

fn advance(stage: &mut RunStage, next: RunStage) {
    debug_assert!(next > *stage, "stage {} cannot follow {}", next, stage);
    debug!("Stage: {} -> {}", stage, next);
    *stage = next;
}

/// Main engine that turns a folder of photos into the promo video
///
/// The engine follows a clear pipeline:
/// 1. Dependency check - the encoder must answer a version query
/// 2. Image Resolution - discover images and apply the explicit order
/// 3. Title Frame - compose the branded closing frame
/// 4. Normalization - cover-fit every frame into the scratch workspace
/// 5. Segment Encoding - one fixed-length clip per frame
/// 6. Merge - chain crossfades into the output file
///
/// The scratch workspace is removed whichever way the run ends.
pub struct ReelEngine {
    config: Config,
    paths: ReelPaths,
    backend: Arc<dyn EncoderBackend>,
}

impl ReelEngine {
    /// Create an engine that drives the configured ffmpeg binary
    pub fn new(config: Config, paths: ReelPaths) -> Self {
        let backend = Arc::new(FfmpegCli::new(config.encoder_binary.clone()));
        Self::with_backend(config, paths, backend)
    }

    pub fn with_backend(config: Config, paths: ReelPaths, backend: Arc<dyn EncoderBackend>) -> Self {
        Self { config, paths, backend }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn paths(&self) -> &ReelPaths {
        &self.paths
    }

    /// Run the whole pipeline once
    pub async fn run(&self) -> Result<EncodedVideo> {
        let mut stage = RunStage::Init;

        info!("🎬 Starting Promo-Reel");
        info!("   Images: {:?}", self.paths.images_dir);
        info!("   Output: {:?}", self.paths.output);

        self.check_dependencies()?;
        self.config.validate()?;
        self.paths.validate()?;

        // Pipeline Step 2: Image Resolution
        let images = self.resolve_images()?;
        let plan = TransitionPlan::from_config(images.len() + 1, &self.config.video)?;
        advance(&mut stage, RunStage::Resolved);

        // Pipeline Step 3: Title Frame
        let title_frame = self.compose_title_frame();
        advance(&mut stage, RunStage::Composed);

        let workspace = ScratchWorkspace::create(&self.paths.scratch_dir)?;
        let outcome = self.render(&workspace, &images, &title_frame, &plan, &mut stage).await;

        if let Err(e) = &outcome {
            error!("Run failed after stage '{}': {}", stage, e);
        }

        let cleaned = workspace.cleanup();
        advance(&mut stage, RunStage::CleanedUp);

        let encoded = outcome?;
        cleaned?;
        advance(&mut stage, RunStage::Done);

        info!("🎉 Video saved to: {:?}", encoded.path);
        info!(
            "   {:.1}s, {} segments, {} KB",
            encoded.duration,
            encoded.segment_count,
            encoded.file_size / 1024
        );

        Ok(encoded)
    }

    // ==========================================
    // PIPELINE STEP 1: DEPENDENCY CHECK
    // ==========================================

    fn check_dependencies(&self) -> Result<()> {
        debug!("Checking encoder '{}'", self.backend.name());
        self.backend.probe()
    }

    // ==========================================
    // PIPELINE STEP 2: IMAGE RESOLUTION
    // ==========================================

    fn resolve_images(&self) -> Result<OrderedImageSequence> {
        info!("📷 Resolving images...");
        ImageSetResolver::new(&self.paths.images_dir).resolve(&self.config.order)
    }

    // ==========================================
    // PIPELINE STEP 3: TITLE FRAME
    // ==========================================

    fn compose_title_frame(&self) -> Frame {
        info!("🖼️  Creating final frame...");
        let video = &self.config.video;
        let composer = FrameComposer::new(self.config.title.clone(), video.width, video.height);
        let frame = composer.compose(Some(&self.paths.logo));
        info!("   ✅ Final frame created");
        frame
    }

    async fn render(
        &self,
        workspace: &ScratchWorkspace,
        images: &OrderedImageSequence,
        title_frame: &Frame,
        plan: &TransitionPlan,
        stage: &mut RunStage,
    ) -> Result<EncodedVideo> {
        let frames = self.normalize_frames(workspace, images, title_frame)?;
        advance(stage, RunStage::Normalized);

        let segments = self.encode_segments(workspace, &frames).await?;
        advance(stage, RunStage::Encoded);

        let merger = TransitionMerger::new(self.config.video.clone(), Arc::clone(&self.backend));
        let encoded = merger.merge(&segments, plan, &self.paths.output).await?;
        advance(stage, RunStage::Merged);

        Ok(encoded)
    }

    // ==========================================
    // PIPELINE STEP 4: NORMALIZATION
    // ==========================================

    /// Cover-fit every photo, then the title frame, into the workspace.
    /// Returns the frame paths in playback order, title frame last.
    fn normalize_frames(
        &self,
        workspace: &ScratchWorkspace,
        images: &OrderedImageSequence,
        title_frame: &Frame,
    ) -> Result<Vec<std::path::PathBuf>> {
        let video = &self.config.video;
        let normalizer = FrameNormalizer::new(video.width, video.height);
        let quality = video.frame_quality;

        info!("📐 Resizing {} images to {}x{}...", images.len(), video.width, video.height);

        let mut frames = Vec::with_capacity(images.len() + 1);
        for (i, image) in images.iter().enumerate() {
            let frame_path = workspace.frame_path(i);
            debug!("{} -> {:?}", image.name, frame_path);
            normalizer.normalize_file(&image.path, &frame_path, quality)?;
            frames.push(frame_path);
        }

        title_frame.save_jpeg(workspace.title_card_path(), quality)?;
        let final_frame = workspace.final_frame_path();
        normalizer.normalize_file(workspace.title_card_path(), &final_frame, quality)?;
        frames.push(final_frame);

        Ok(frames)
    }

    // ==========================================
    // PIPELINE STEP 5: SEGMENT ENCODING
    // ==========================================

    async fn encode_segments(
        &self,
        workspace: &ScratchWorkspace,
        frames: &[std::path::PathBuf],
    ) -> Result<Vec<VideoSegment>> {
        info!("🎞️  Creating video segments...");

        let encoder = SegmentEncoder::new(self.config.video.clone(), Arc::clone(&self.backend));
        let photo_count = frames.len() - 1;
        let mut segments = Vec::with_capacity(frames.len());

        for (i, frame) in frames.iter().enumerate() {
            if i < photo_count {
                let stage = format!("segment {}/{}", i + 1, photo_count);
                segments.push(encoder.encode(&stage, frame, &workspace.segment_path(i)).await?);
                info!("   Created segment {}/{}", i + 1, photo_count);
            } else {
                segments.push(
                    encoder
                        .encode("final segment", frame, &workspace.final_segment_path())
                        .await?,
                );
                info!("   Created final segment");
            }
        }

        Ok(segments)
    }
}
