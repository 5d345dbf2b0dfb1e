use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::speech::{SpeechError, SpeechSynthesizer};

/// Renders speech with the `edge-tts` command line tool.
/// Text is passed as a single `--text=` argument so a leading `-` is never
/// parsed as an option; no shell is involved.
pub struct EdgeTtsSynthesizer {
    program: PathBuf,
    voice: Option<String>,
}

impl EdgeTtsSynthesizer {
    pub fn new(program: impl Into<PathBuf>, voice: Option<String>) -> Self {
        Self {
            program: program.into(),
            voice,
        }
    }

    fn command(&self, text: &str, output: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg(format!("--text={text}"))
            .arg("--write-media")
            .arg(output);
        if let Some(voice) = &self.voice {
            cmd.arg("--voice").arg(voice);
        }
        cmd.kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl SpeechSynthesizer for EdgeTtsSynthesizer {
    async fn synthesize(&self, text: &str, output: &Path) -> Result<(), SpeechError> {
        debug!("Synthesizing {} chars into {}", text.chars().count(), output.display());
        let out = self.command(text, output).output().await?;
        if !out.status.success() {
            return Err(SpeechError::Command {
                program: self.program.display().to_string(),
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(cmd: &Command) -> Vec<String> {
        cmd.as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_text_is_a_single_argument() {
        let tts = EdgeTtsSynthesizer::new("edge-tts", None);
        let cmd = tts.command("Hello; rm -rf / 'quoted'", Path::new("static/output_ab.mp3"));
        assert_eq!(
            args_of(&cmd),
            vec![
                "--text=Hello; rm -rf / 'quoted'",
                "--write-media",
                "static/output_ab.mp3"
            ]
        );
    }

    #[test]
    fn test_text_starting_with_dash_stays_attached_to_flag() {
        let tts = EdgeTtsSynthesizer::new("edge-tts", None);
        let args = args_of(&tts.command("-Led the migration", Path::new("out.mp3")));
        assert_eq!(args[0], "--text=-Led the migration");
        assert_eq!(args[1], "--write-media");
    }

    #[test]
    fn test_voice_is_forwarded_when_configured() {
        let tts = EdgeTtsSynthesizer::new("edge-tts", Some("fr-FR-DeniseNeural".to_string()));
        let args = args_of(&tts.command("Bonjour", Path::new("out.mp3")));
        assert_eq!(&args[3..], ["--voice", "fr-FR-DeniseNeural"]);
    }
}
