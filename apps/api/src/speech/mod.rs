//! Speech I/O — turns uploaded recordings into text and replies into audio files.
//!
//! The engines are external: ffmpeg for format conversion, an OpenAI-compatible
//! transcription API, and the `edge-tts` command for synthesis. Each sits behind a
//! trait so the interview flow can be tested without them.
//!
//! File layout (all names carry a fresh hex id):
//! - `<work_dir>/temp_<id>.wav`       raw upload
//! - `<work_dir>/converted_<id>.wav`  16 kHz mono copy fed to the transcriber
//! - `<audio_dir>/output_<id>.mp3`    synthesized reply, served by id

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

pub mod edge_tts;
pub mod ffmpeg;
pub mod whisper;

/// Ceiling on the text handed to the synthesizer.
pub const SPEECH_CHAR_LIMIT: usize = 600;

const CLIP_PREFIX: &str = "output_";
const CLIP_SUFFIX: &str = ".mp3";

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{program} exited with {status}: {stderr}")]
    Command {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("Transcription request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transcription API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Recording is empty")]
    EmptyRecording,
}

/// Converts an arbitrary recording into 16 kHz mono WAV.
#[async_trait]
pub trait AudioConverter: Send + Sync {
    async fn convert(&self, input: &Path, output: &Path) -> Result<(), SpeechError>;
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, wav: &Path) -> Result<String, SpeechError>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, output: &Path) -> Result<(), SpeechError>;
}

/// A synthesized reply on disk. `id` is the file name and the public handle.
#[derive(Debug, Clone)]
pub struct AudioClip {
    pub id: String,
}

pub struct SpeechIo {
    work_dir: PathBuf,
    audio_dir: PathBuf,
    converter: Arc<dyn AudioConverter>,
    transcriber: Arc<dyn Transcriber>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
}

impl SpeechIo {
    pub fn new(
        work_dir: PathBuf,
        audio_dir: PathBuf,
        converter: Arc<dyn AudioConverter>,
        transcriber: Arc<dyn Transcriber>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            work_dir,
            audio_dir,
            converter,
            transcriber,
            synthesizer,
        }
    }

    /// Creates the working and audio directories if they are missing.
    pub async fn prepare_dirs(&self) -> Result<(), SpeechError> {
        tokio::fs::create_dir_all(&self.work_dir).await?;
        tokio::fs::create_dir_all(&self.audio_dir).await?;
        Ok(())
    }

    /// Writes the upload, converts it, transcribes it, and removes both
    /// intermediate files whatever the outcome.
    pub async fn transcribe_upload(&self, audio: &[u8]) -> Result<String, SpeechError> {
        if audio.is_empty() {
            return Err(SpeechError::EmptyRecording);
        }

        let id = Uuid::new_v4().simple().to_string();
        let upload = self.work_dir.join(format!("temp_{id}.wav"));
        let converted = self.work_dir.join(format!("converted_{id}.wav"));

        let result: Result<String, SpeechError> = async {
            tokio::fs::write(&upload, audio).await?;
            self.converter.convert(&upload, &converted).await?;
            self.transcriber.transcribe(&converted).await
        }
        .await;

        remove_quietly(&upload).await;
        remove_quietly(&converted).await;

        let transcript = result?;
        debug!("Transcribed {} bytes into {} chars", audio.len(), transcript.len());
        Ok(transcript.trim().to_string())
    }

    /// Sanitizes `text` and renders it into a new clip under the audio directory.
    pub async fn synthesize_reply(&self, text: &str) -> Result<AudioClip, SpeechError> {
        let id = format!("{CLIP_PREFIX}{}{CLIP_SUFFIX}", Uuid::new_v4().simple());
        let path = self.audio_dir.join(&id);
        let spoken = sanitize_for_speech(text);

        if let Err(e) = self.synthesizer.synthesize(&spoken, &path).await {
            remove_quietly(&path).await;
            return Err(e);
        }
        Ok(AudioClip { id })
    }

    /// Resolves a clip id to its path. Only ids this adapter hands out are accepted.
    pub fn clip_path(&self, id: &str) -> Option<PathBuf> {
        is_clip_id(id).then(|| self.audio_dir.join(id))
    }
}

/// Strips what the synthesizer should not read: double quotes become single
/// quotes, markdown bold markers go, newlines collapse to spaces. The result is
/// cut to `SPEECH_CHAR_LIMIT` characters.
pub fn sanitize_for_speech(text: &str) -> String {
    let cleaned = text
        .replace('"', "'")
        .replace("**", "")
        .replace(['\r', '\n'], " ");
    cleaned
        .trim()
        .chars()
        .take(SPEECH_CHAR_LIMIT)
        .collect::<String>()
        .trim_end()
        .to_string()
}

fn is_clip_id(id: &str) -> bool {
    id.strip_prefix(CLIP_PREFIX)
        .and_then(|rest| rest.strip_suffix(CLIP_SUFFIX))
        .is_some_and(|hex| !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Could not remove {}: {e}", path.display());
        }
    }
}
