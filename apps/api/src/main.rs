mod analysis;
mod coach;
mod config;
mod documents;
mod errors;
mod interview;
mod janitor;
mod llm_client;
mod routes;
mod scraping;
mod speech;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::interview::controller::TurnController;
use crate::interview::session::SessionStore;
use crate::janitor::Janitor;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::scraping::fetch::HttpPageFetcher;
use crate::speech::edge_tts::EdgeTtsSynthesizer;
use crate::speech::ffmpeg::FfmpegConverter;
use crate::speech::whisper::WhisperApiTranscriber;
use crate::speech::SpeechIo;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Coach API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(
        config.llm_api_url.clone(),
        config.llm_api_key.clone(),
        config.llm_model.clone(),
        config.llm_timeout,
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    // Initialize speech engines
    let stt_client = reqwest::Client::builder()
        .timeout(config.llm_timeout)
        .build()?;
    let speech = SpeechIo::new(
        config.work_dir.clone(),
        config.audio_dir.clone(),
        Arc::new(FfmpegConverter::new(&config.ffmpeg_path)),
        Arc::new(WhisperApiTranscriber::new(
            stt_client,
            config.stt_api_url.clone(),
            config.stt_api_key.clone(),
            config.stt_model.clone(),
        )),
        Arc::new(EdgeTtsSynthesizer::new(
            &config.tts_command,
            config.tts_voice.clone(),
        )),
    );
    speech.prepare_dirs().await?;
    info!(
        "Speech I/O ready (work dir: {}, audio dir: {})",
        config.work_dir.display(),
        config.audio_dir.display()
    );

    let fetcher = HttpPageFetcher::new(config.linkedin_li_at.clone())?;

    // Build app state
    let state = AppState {
        sessions: SessionStore::new(),
        llm: Arc::new(llm),
        speech: Arc::new(speech),
        fetcher: Arc::new(fetcher),
        controller: TurnController::new(config.history_window),
        config: config.clone(),
    };

    spawn_maintenance(&config, state.sessions.clone());

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically sweeps stale audio artifacts and evicts idle sessions.
fn spawn_maintenance(config: &Config, sessions: SessionStore) {
    let janitor = Janitor::for_dirs(&config.work_dir, &config.audio_dir, config.temp_max_age);
    let session_idle = config.session_idle;
    let mut interval =
        tokio::time::interval(config.janitor_interval.max(Duration::from_secs(1)));

    tokio::spawn(async move {
        loop {
            interval.tick().await;

            let sweeper = janitor.clone();
            match tokio::task::spawn_blocking(move || sweeper.sweep(SystemTime::now())).await {
                Ok(report) if !report.removed.is_empty() => {
                    info!("Janitor removed {} stale audio files", report.removed.len());
                }
                Ok(_) => {}
                Err(e) => warn!("Janitor sweep panicked: {e}"),
            }

            let evicted = sessions.evict_idle(session_idle, Instant::now());
            if evicted > 0 {
                info!(
                    "Evicted {evicted} idle interview sessions ({} remain)",
                    sessions.len()
                );
            }
        }
    });
}
