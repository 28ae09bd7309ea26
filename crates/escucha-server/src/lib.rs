//! Escucha HTTP server
//!
//! Configuration, curriculum loading, the keyed audio store and the
//! axum API that wires the language-model and speech-synthesis layers
//! together.

pub mod api;
pub mod audio;
pub mod config;
pub mod curriculum;
pub mod error;

pub use api::{
    create_router, AppState, ErrorResponse, GenerateRequest, GenerateResponse, SubmitRequest,
    SubmitResponse,
};
pub use audio::AudioStore;
pub use config::{Config, LlmConfig, TtsConfig};
pub use curriculum::Curriculum;
pub use error::{EscuchaError, Result};
