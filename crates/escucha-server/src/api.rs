//! HTTP API endpoints for the Escucha server.
//!
//! This module provides the REST API consumed by the web client:
//!
//! - `POST /api/chat` - Generate a listening exercise (and its audio)
//! - `GET /api/audio/{id}` - Stream a generated audio artifact
//! - `POST /api/submit_answers` - Grade a submission
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use escucha_llm::ChatClient;
//! use escucha_server::{create_router, AppState, AudioStore, Config, Curriculum};
//! use escucha_tts::XttsEngine;
//!
//! # async fn example() -> escucha_server::Result<()> {
//! let config = Config::default();
//! let state = AppState {
//!     curriculum: Arc::new(Curriculum::from_text("topics", "greetings, numbers")?),
//!     llm: Arc::new(ChatClient::new(
//!         &config.llm.base_url,
//!         &config.llm.model,
//!         None,
//!         Duration::from_secs(config.llm.timeout_secs),
//!     )),
//!     synthesizer: Arc::new(XttsEngine::new(
//!         &config.tts.base_url,
//!         Duration::from_secs(config.tts.timeout_secs),
//!     )),
//!     audio: Arc::new(AudioStore::new(&config.audio_dir)?),
//!     config,
//! };
//!
//! let router = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//! axum::serve(listener, router).await?;
//! # Ok(())
//! # }
//! ```

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use escucha_llm::{
    generate_exercise, grade_submission, Exercise, Feedback, GradeError, LanguageModel, Submission,
};
use escucha_tts::{SpeechSynthesizer, SynthesisRequest};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{audio::AudioStore, config::Config, curriculum::Curriculum, error::EscuchaError};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for the generate-exercise endpoint.
///
/// Every field is optional; absent fields fall back to the configured
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    /// Optional topic override; when set, the exercise is grounded on it
    /// instead of the curriculum.
    #[serde(default)]
    pub text: Option<String>,

    /// Target language code for the passage and questions.
    #[serde(default)]
    pub language: Option<String>,

    /// Reference voice sample, relative to the voices directory.
    #[serde(default)]
    pub speaker_wav: Option<String>,
}

/// Response body for the generate-exercise endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The generated exercise.
    pub data: Exercise,

    /// Identifier of the audio artifact rendered for this exercise.
    pub audio_id: Uuid,

    /// URL path the artifact is served under.
    pub audio_url: String,
}

/// Request body for the submit-answers endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    /// The exercise as issued, round-tripped by the client.
    pub exercise_data: Exercise,

    /// The user's answers, positional against the exercise.
    pub user_answers: Submission,
}

/// Response body for the submit-answers endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Per-question verdicts.
    pub feedback: Feedback,
}

/// Error response body returned on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Description of the error.
    pub error: String,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the HTTP server.
///
/// Everything a handler touches is an explicit dependency here - the
/// curriculum, the model client, the synthesis engine and the audio
/// store - so tests swap in stubs and nothing hides in process globals.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Config,
    /// Curriculum text loaded at startup, shared read-only.
    pub curriculum: Arc<Curriculum>,
    /// Language model used for generation and grading.
    pub llm: Arc<dyn LanguageModel>,
    /// Engine that renders passages to audio.
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    /// Keyed store for generated audio artifacts.
    pub audio: Arc<AudioStore>,
}

// ============================================================================
// API Error Type
// ============================================================================

/// Wrapper turning [`EscuchaError`] into an HTTP response.
struct ApiError(EscuchaError);

impl<E> From<E> for ApiError
where
    EscuchaError: From<E>,
{
    fn from(e: E) -> Self {
        Self(EscuchaError::from(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EscuchaError::AudioNotFound { .. } => StatusCode::NOT_FOUND,
            EscuchaError::VoiceNotFound { .. }
            | EscuchaError::Grading(GradeError::AnswerCountMismatch { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            EscuchaError::Exercise(_)
            | EscuchaError::Grading(_)
            | EscuchaError::Synthesis(_)
            | EscuchaError::Summarization(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, status = status.as_u16(), "Request failed");
        } else {
            warn!(error = %self.0, status = status.as_u16(), "Request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the HTTP router with all API endpoints.
///
/// # Returns
///
/// An axum `Router` configured with:
/// - All API routes under `/api`
/// - CORS middleware for the web client
/// - Tracing middleware for request logging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/chat", post(handle_generate))
        .route("/audio/:id", get(handle_audio))
        .route("/submit_answers", post(handle_submit));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

// ============================================================================
// Handlers
// ============================================================================

/// Handler for `POST /api/chat`.
///
/// Generates a listening exercise grounded on the curriculum (or the
/// request's topic override), renders its passage to audio and stores
/// the artifact under a fresh identifier. Nothing is stored when any
/// step fails.
async fn handle_generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let language = request
        .language
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| state.config.tts.default_language.clone());
    let speaker_wav = request
        .speaker_wav
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| state.config.tts.default_speaker_wav.clone());
    let topic = request.text.filter(|t| !t.trim().is_empty());

    info!(
        language = %language,
        speaker_wav = %speaker_wav,
        has_topic = topic.is_some(),
        "Generating exercise"
    );

    // The reference voice is checked before any model call so a bad
    // request fails fast and cheap.
    let voice_path = FsPath::new(&state.config.voices_dir).join(&speaker_wav);
    if !voice_path.is_file() {
        return Err(EscuchaError::voice_not_found(voice_path).into());
    }

    let grounding = topic.as_deref().unwrap_or(&state.curriculum.content);
    let exercise = generate_exercise(state.llm.as_ref(), grounding, &language).await?;

    let wav = state
        .synthesizer
        .synthesize(&SynthesisRequest {
            text: exercise.text.clone(),
            language,
            speaker_wav: voice_path.display().to_string(),
        })
        .await?;

    let audio_id = state.audio.put(&wav).await?;

    info!(%audio_id, "Exercise ready");

    Ok(Json(GenerateResponse {
        data: exercise,
        audio_url: AudioStore::url(audio_id),
        audio_id,
    }))
}

/// Handler for `GET /api/audio/{id}`.
///
/// Streams the stored WAV for the identifier. A malformed id is treated
/// the same as an unknown one: there is no such artifact.
async fn handle_audio(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let Ok(id) = Uuid::parse_str(&id) else {
        return Err(EscuchaError::audio_not_found(id).into());
    };

    let bytes = state.audio.read(id).await?;
    Ok(([(header::CONTENT_TYPE, "audio/wav")], bytes).into_response())
}

/// Handler for `POST /api/submit_answers`.
///
/// Grades the submission against the exercise the client round-tripped.
/// Misaligned answer lists are rejected outright rather than silently
/// truncated.
async fn handle_submit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    info!(
        mcq_answers = request.user_answers.mcq_answers.len(),
        open_ended_answers = request.user_answers.open_ended_answers.len(),
        "Grading submission"
    );

    let feedback = grade_submission(
        state.llm.as_ref(),
        &request.exercise_data,
        &request.user_answers,
    )
    .await?;

    Ok(Json(SubmitResponse { feedback }))
}

// ============================================================================
// Tests
// ============================================================================
