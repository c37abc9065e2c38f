use thiserror::Error;

/// Main error type for the Promo-Reel library
#[derive(Error, Debug)]
pub enum ReelError {
    #[error("Image resolution error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Frame processing error: {0}")]
    Frame(#[from] FrameError),

    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Errors raised while discovering and ordering the input images
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Images directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No images found in {path}")]
    NoImagesFound { path: String },

    #[error("None of the specified images were found: {requested:?}")]
    NoOrderedImagesFound { requested: Vec<String> },
}

/// Raster decode/encode errors
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Failed to decode image {path}: {reason}")]
    DecodeFailed { path: String, reason: String },

    #[error("Failed to write frame {path}: {reason}")]
    EncodeFailed { path: String, reason: String },

    #[error("Invalid frame dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// External encoder errors
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Encoder '{binary}' is not installed or not in PATH")]
    EncoderNotFound { binary: String },

    #[error("Failed to launch encoder for {stage}: {reason}")]
    SpawnFailed { stage: String, reason: String },

    #[error("Encoder failed during {stage} ({status}): {stderr}")]
    EncoderFailed {
        stage: String,
        status: String,
        stderr: String,
    },

    #[error("Invalid transition plan: {details}")]
    InvalidPlan { details: String },
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path} ({reason})")]
    ParseFailed { path: String, reason: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Convenience type alias for Results using ReelError
pub type Result<T> = std::result::Result<T, ReelError>;

impl ReelError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Encode(EncodeError::EncoderNotFound { binary }) => {
                format!(
                    "{} is not installed or not in PATH. Please install ffmpeg: https://ffmpeg.org/download.html",
                    binary
                )
            }
            Self::Encode(EncodeError::EncoderFailed { stage, stderr, .. }) => {
                format!("Error creating video ({}).\nError details: {}", stage, stderr)
            }
            Self::Resolve(ResolveError::DirectoryNotFound { path }) => {
                format!("Images directory not found: {}", path)
            }
            Self::Resolve(ResolveError::NoOrderedImagesFound { .. }) => {
                "None of the specified images were found!".to_string()
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("Configuration file '{}' not found.", path)
            }
            _ => self.to_string(),
        }
    }
}
