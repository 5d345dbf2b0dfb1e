use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::speech::{AudioConverter, SpeechError};

/// Resamples recordings to 16 kHz mono WAV with the `ffmpeg` binary.
pub struct FfmpegConverter {
    ffmpeg_path: PathBuf,
}

impl FfmpegConverter {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-ar", "16000", "-ac", "1", "-f", "wav"])
            .arg(output)
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl AudioConverter for FfmpegConverter {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), SpeechError> {
        debug!("Converting {} to 16 kHz mono", input.display());
        let out = self.command(input, output).output().await?;
        if !out.status.success() {
            return Err(SpeechError::Command {
                program: self.ffmpeg_path.display().to_string(),
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}
