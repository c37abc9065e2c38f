use std::path::{Component, Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration for a Promo-Reel run
///
/// The value is built once (defaults, TOML file, CLI overrides) and then
/// handed read-only to every pipeline component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Explicit image order by filename (empty = all images, sorted by name)
    pub order: Vec<String>,

    /// External encoder executable
    pub encoder_binary: String,

    /// Timing, resolution and codec settings
    pub video: VideoConfig,

    /// Closing title frame layout
    pub title: TitleConfig,

    /// Input/output locations relative to the project root
    pub paths: PathsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            encoder_binary: "ffmpeg".to_string(),
            video: VideoConfig::default(),
            title: TitleConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.video.validate()?;
        self.title.validate()?;
        self.paths.validate()?;

        if self.encoder_binary.trim().is_empty() {
            return Err(invalid("encoder_binary", &self.encoder_binary));
        }

        Ok(())
    }

    /// Resolve the configured paths against a project root
    pub fn resolve_paths<P: AsRef<Path>>(&self, root: P) -> ReelPaths {
        self.paths.resolve(root.as_ref())
    }
}

fn invalid(key: &str, value: impl ToString) -> crate::error::ReelError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
    .into()
}

/// Video timing and output format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Seconds each image is on screen
    pub image_duration: f64,

    /// Seconds of crossfade between neighbouring images
    pub transition_duration: f64,

    /// Output width in pixels
    pub width: u32,

    /// Output height in pixels
    pub height: u32,

    /// Output frame rate
    pub fps: u32,

    /// Encoder codec name
    pub codec: String,

    /// Encoder pixel format
    pub pixel_format: String,

    /// JPEG quality (1-100) of the intermediate frames
    pub frame_quality: u8,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            image_duration: 3.0,
            transition_duration: 0.5,
            width: 1920,
            height: 1080,
            fps: 30,
            codec: "libx264".to_string(),
            pixel_format: "yuv420p".to_string(),
            frame_quality: 95,
        }
    }
}

impl VideoConfig {
    /// Length of every encoded segment: the on-screen time plus the overlap
    /// consumed by the crossfade into the next segment.
    pub fn segment_duration(&self) -> f64 {
        self.image_duration + self.transition_duration
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(invalid("video.resolution", format!("{}x{}", self.width, self.height)));
        }

        // yuv420p needs even dimensions
        if self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(invalid("video.resolution", format!("{}x{}", self.width, self.height)));
        }

        if self.fps == 0 {
            return Err(invalid("video.fps", self.fps));
        }

        if !(self.image_duration > 0.0) {
            return Err(invalid("video.image_duration", self.image_duration));
        }

        if !(self.transition_duration >= 0.0) {
            return Err(invalid("video.transition_duration", self.transition_duration));
        }

        if self.transition_duration >= self.image_duration {
            return Err(invalid(
                "video.transition_duration",
                format!(
                    "{} (must be shorter than image_duration {})",
                    self.transition_duration, self.image_duration
                ),
            ));
        }

        if !(1..=100).contains(&self.frame_quality) {
            return Err(invalid("video.frame_quality", self.frame_quality));
        }

        if self.codec.is_empty() {
            return Err(invalid("video.codec", &self.codec));
        }

        if self.pixel_format.is_empty() {
            return Err(invalid("video.pixel_format", &self.pixel_format));
        }

        Ok(())
    }
}

/// Closing title frame layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleConfig {
    /// Caption, split into two lines at `delimiter`
    pub caption: String,

    /// Character splitting the caption; it is repeated at the start of line 2
    pub delimiter: char,

    /// Side of the square box the logo is shrunk into
    pub logo_box_size: u32,

    /// Pixel size of the first caption line
    pub headline_size: f32,

    /// Pixel size of the second caption line
    pub subline_size: f32,

    /// Vertical distance between the two caption lines
    pub line_spacing: u32,

    /// Space kept between the logo and the caption
    pub logo_gap: u32,

    /// Canvas color
    pub background: [u8; 3],

    /// Caption color
    pub text_color: [u8; 3],

    /// Font files tried in order; the first that loads wins
    pub font_candidates: Vec<PathBuf>,
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            caption: "Meet us at Galilai Group @ Brown".to_string(),
            delimiter: '@',
            logo_box_size: 350,
            headline_size: 72.0,
            subline_size: 48.0,
            line_spacing: 100,
            logo_gap: 40,
            background: [255, 255, 255],
            text_color: [0, 0, 0],
            font_candidates: vec![
                PathBuf::from("/System/Library/Fonts/Helvetica.ttc"),
                PathBuf::from("/System/Library/Fonts/Supplemental/Helvetica.ttc"),
                PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
                PathBuf::from("/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf"),
            ],
        }
    }
}

impl TitleConfig {
    fn validate(&self) -> Result<()> {
        if self.caption.trim().is_empty() {
            return Err(invalid("title.caption", &self.caption));
        }

        if self.logo_box_size == 0 {
            return Err(invalid("title.logo_box_size", self.logo_box_size));
        }

        if !(self.headline_size > 0.0) || !(self.subline_size > 0.0) {
            return Err(invalid(
                "title.font_size",
                format!("{}/{}", self.headline_size, self.subline_size),
            ));
        }

        Ok(())
    }
}

/// File layout, relative to the project root unless absolute
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub images_dir: PathBuf,
    pub logo: PathBuf,
    pub output: PathBuf,
    pub scratch_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            images_dir: PathBuf::from("public/assets/images_for_video"),
            logo: PathBuf::from("public/assets/logos/lab-logo.svg"),
            output: PathBuf::from("public/assets/videos/homepage.mp4"),
            scratch_dir: PathBuf::from("temp_video_frames"),
        }
    }
}

impl PathsConfig {
    /// The scratch directory is wiped at the start of every run, so it must
    /// name a real subdirectory and never climb out of its parent.
    fn validate(&self) -> Result<()> {
        let scratch = &self.scratch_dir;
        let names_directory = matches!(scratch.components().last(), Some(Component::Normal(_)));
        let climbs = scratch.components().any(|c| c == Component::ParentDir);

        if !names_directory || climbs {
            return Err(invalid("paths.scratch_dir", scratch.display()));
        }

        Ok(())
    }

    fn resolve(&self, root: &Path) -> ReelPaths {
        let join = |p: &Path| if p.is_absolute() { p.to_path_buf() } else { root.join(p) };

        ReelPaths {
            images_dir: join(&self.images_dir),
            logo: join(&self.logo),
            output: join(&self.output),
            scratch_dir: join(&self.scratch_dir),
        }
    }
}

/// Concrete locations for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReelPaths {
    pub images_dir: PathBuf,
    pub logo: PathBuf,
    pub output: PathBuf,
    pub scratch_dir: PathBuf,
}

impl ReelPaths {
    /// Reject a scratch directory that holds the inputs or the output
    pub fn validate(&self) -> Result<()> {
        for (key, path) in [
            ("paths.images_dir", &self.images_dir),
            ("paths.logo", &self.logo),
            ("paths.output", &self.output),
        ] {
            if path.starts_with(&self.scratch_dir) {
                return Err(invalid(
                    "paths.scratch_dir",
                    format!("{} contains {} ({})", self.scratch_dir.display(), key, path.display()),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.video.segment_duration(), 3.5);
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("reel.toml");

        let mut original_config = Config::default();
        original_config.order = vec!["b.jpg".to_string(), "a.jpg".to_string()];

        original_config.save_to_file(&file_path).unwrap();
        let loaded_config = Config::from_file(&file_path).unwrap();

        assert_eq!(loaded_config.order, original_config.order);
        assert_eq!(loaded_config.video.fps, original_config.video.fps);
        assert_eq!(loaded_config.title.delimiter, '@');
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("partial.toml");
        std::fs::write(&file_path, "[video]\nimage_duration = 4.0\n").unwrap();

        let config = Config::from_file(&file_path).unwrap();
        assert_eq!(config.video.image_duration, 4.0);
        assert_eq!(config.video.transition_duration, 0.5);
        assert_eq!(config.encoder_binary, "ffmpeg");
    }

    #[test]
    fn test_transition_must_be_shorter_than_image() {
        let mut config = Config::default();
        config.video.transition_duration = 3.0;
        assert!(config.validate().is_err());

        config.video.transition_duration = 4.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_odd_resolution_rejected() {
        let mut config = Config::default();
        config.video.width = 1919;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = Config::from_file("/definitely/not/here.toml");
        assert!(matches!(
            result,
            Err(crate::error::ReelError::Config(ConfigError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_paths_resolve_against_root() {
        let mut config = Config::default();
        config.paths.output = PathBuf::from("/abs/out.mp4");

        let paths = config.resolve_paths("/project");
        assert_eq!(paths.images_dir, PathBuf::from("/project/public/assets/images_for_video"));
        assert_eq!(paths.output, PathBuf::from("/abs/out.mp4"));
        assert_eq!(paths.scratch_dir, PathBuf::from("/project/temp_video_frames"));
    }

    #[test]
    fn test_scratch_dir_must_name_a_subdirectory() {
        for bad in [".", "", "/", "..", "frames/..", "../outside"] {
            let mut config = Config::default();
            config.paths.scratch_dir = PathBuf::from(bad);
            assert!(config.validate().is_err(), "scratch_dir {:?} accepted", bad);
        }

        let mut config = Config::default();
        config.paths.scratch_dir = PathBuf::from("build/frames");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_scratch_dir_must_not_contain_inputs_or_output() {
        let mut config = Config::default();
        config.paths.scratch_dir = PathBuf::from("public");
        assert!(config.validate().is_ok());
        assert!(config.resolve_paths("/project").validate().is_err());

        config.paths.scratch_dir = PathBuf::from("/project");
        assert!(config.resolve_paths("/project").validate().is_err());

        let paths = Config::default().resolve_paths("/project");
        assert!(paths.validate().is_ok());
    }
}
