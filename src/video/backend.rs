use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use tokio::task;
use tracing::debug;

use crate::error::{EncodeError, Result};

/// One call to the external encoder
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderInvocation {
    /// Human readable step name used in logs and errors
    pub stage: String,

    /// Arguments after the executable
    pub args: Vec<String>,

    /// File the invocation produces
    pub output: PathBuf,
}

impl EncoderInvocation {
    pub fn new<S: Into<String>>(stage: S, args: Vec<String>, output: PathBuf) -> Self {
        Self {
            stage: stage.into(),
            args,
            output,
        }
    }
}

/// The external encoder as seen by the pipeline
pub trait EncoderBackend: Send + Sync {
    /// Returns the executable name used in messages
    fn name(&self) -> &str;

    /// Check that the encoder can be launched at all
    fn probe(&self) -> Result<()>;

    /// Run one invocation to completion.
    ///
    /// A non-zero exit must surface as [`EncodeError::EncoderFailed`] with the
    /// encoder's error output untouched.
    fn run(&self, invocation: &EncoderInvocation) -> Result<()>;
}

/// The `ffmpeg` command line tool
#[derive(Debug, Clone)]
pub struct FfmpegCli {
    binary: String,
}

impl FfmpegCli {
    pub fn new<S: Into<String>>(binary: S) -> Self {
        Self { binary: binary.into() }
    }
}

impl Default for FfmpegCli {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl EncoderBackend for FfmpegCli {
    fn name(&self) -> &str {
        &self.binary
    }

    fn probe(&self) -> Result<()> {
        let available = Command::new(&self.binary)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false);

        if available {
            Ok(())
        } else {
            Err(EncodeError::EncoderNotFound {
                binary: self.binary.clone(),
            }
            .into())
        }
    }

    fn run(&self, invocation: &EncoderInvocation) -> Result<()> {
        debug!("{} {}", self.binary, invocation.args.join(" "));

        let output = Command::new(&self.binary)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| EncodeError::SpawnFailed {
                stage: invocation.stage.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(EncodeError::EncoderFailed {
                stage: invocation.stage.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// Run an invocation on the blocking pool and wait for it
pub async fn run_blocking(backend: &Arc<dyn EncoderBackend>, invocation: EncoderInvocation) -> Result<()> {
    let backend = Arc::clone(backend);
    let stage = invocation.stage.clone();

    task::spawn_blocking(move || backend.run(&invocation))
        .await
        .map_err(|e| EncodeError::SpawnFailed {
            stage,
            reason: e.to_string(),
        })?
}

pub(crate) fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReelError;

    #[test]
    fn test_missing_binary_fails_probe() {
        let backend = FfmpegCli::new("definitely-not-an-encoder-binary");
        let result = backend.probe();
        assert!(matches!(
            result,
            Err(ReelError::Encode(EncodeError::EncoderNotFound { .. }))
        ));
    }

    #[test]
    fn test_missing_binary_fails_run() {
        let backend = FfmpegCli::new("definitely-not-an-encoder-binary");
        let invocation = EncoderInvocation::new("probe", vec!["-version".into()], PathBuf::from("x"));
        assert!(matches!(
            backend.run(&invocation),
            Err(ReelError::Encode(EncodeError::SpawnFailed { .. }))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_keeps_stderr() {
        // `sh -c` stands in for an encoder that complains and fails.
        let backend: Arc<dyn EncoderBackend> = Arc::new(FfmpegCli::new("sh"));
        let invocation = EncoderInvocation::new(
            "final merge",
            vec!["-c".into(), "echo 'Invalid filtergraph' >&2; exit 3".into()],
            PathBuf::from("out.mp4"),
        );

        match run_blocking(&backend, invocation).await {
            Err(ReelError::Encode(EncodeError::EncoderFailed { stage, stderr, .. })) => {
                assert_eq!(stage, "final merge");
                assert_eq!(stderr.trim(), "Invalid filtergraph");
            }
            other => panic!("Expected EncoderFailed, got {:?}", other),
        }
    }
}
