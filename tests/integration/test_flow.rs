//! End-to-end integration tests for the Escucha API
//!
//! These tests exercise the complete request flow - generate an
//! exercise, fetch its audio, submit answers for grading - against the
//! real router with scripted model and synthesizer stubs. No external
//! services are contacted.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, Response, StatusCode},
    Router,
};
use escucha_llm::{LanguageModel, LlmError};
use escucha_server::{create_router, AppState, AudioStore, Config, Curriculum};
use escucha_tts::{SpeechSynthesizer, SynthesisError, SynthesisRequest};
use tower::util::ServiceExt;

/// WAV bytes the synthesizer stub produces.
const STUB_WAV: &[u8] = b"RIFF....WAVEfmt canned-render";

/// A scripted model: generation prompts get the exercise JSON, grading
/// prompts get a verdict. Prompts are recorded for inspection.
struct ScriptedModel {
    exercise_json: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn new(exercise_json: impl Into<String>) -> Self {
        Self {
            exercise_json: exercise_json.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt lock poisoned").clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, _system: Option<&str>, prompt: &str) -> Result<String, LlmError> {
        let mut prompts = self.prompts.lock().expect("prompt lock poisoned");
        prompts.push(prompt.to_string());
        if prompt.contains("output only the JSON object") {
            Ok(self.exercise_json.clone())
        } else {
            Ok(format!("Verdict for call {}: correct.", prompts.len()))
        }
    }
}

/// A synthesizer stub that records every request it renders.
struct RecordingSynth {
    requests: Mutex<Vec<SynthesisRequest>>,
}

impl RecordingSynth {
    fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests.lock().expect("request lock poisoned").clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSynth {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, SynthesisError> {
        self.requests
            .lock()
            .expect("request lock poisoned")
            .push(request.clone());
        Ok(STUB_WAV.to_vec())
    }
}

fn exercise_json() -> String {
    let mcq = serde_json::json!({
        "question": "¿Qué compra Luis?",
        "options": { "A": "pan", "B": "leche", "C": "fruta", "D": "queso" }
    });
    serde_json::json!({
        "text": "Luis va al mercado y compra pan para el desayuno.",
        "multiple_choice_questions": [mcq.clone(), mcq.clone(), mcq],
        "open_ended_questions": [
            { "question": "Luis va al ___." },
            { "question": "Compra ___ para el desayuno." },
            { "question": "El desayuno es por la ___." },
            { "question": "Luis paga con ___." }
        ],
        "answers": {
            "multiple_choice": ["A", "A", "A"],
            "open_ended": ["mercado", "pan", "mañana", "efectivo"]
        }
    })
    .to_string()
}

/// Builds a router over temp directories plus handles to the stubs so
/// tests can inspect what reached them. The temp dir must stay alive
/// for the router's lifetime.
fn test_app() -> (
    Router,
    Arc<ScriptedModel>,
    Arc<RecordingSynth>,
    tempfile::TempDir,
) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");

    let voices_dir = dir.path().join("voices");
    std::fs::create_dir_all(&voices_dir).expect("failed to create voices dir");
    std::fs::write(voices_dir.join("esp1.wav"), b"reference sample")
        .expect("failed to write voice sample");

    let mut config = Config::default();
    config.voices_dir = voices_dir.display().to_string();
    config.audio_dir = dir.path().join("audio").display().to_string();

    let llm = Arc::new(ScriptedModel::new(exercise_json()));
    let synthesizer = Arc::new(RecordingSynth::new());

    let state = AppState {
        audio: Arc::new(AudioStore::new(&config.audio_dir).expect("failed to open audio store")),
        curriculum: Arc::new(
            Curriculum::from_text("unit3.pdf", "el mercado: comprar, pagar, precios")
                .expect("failed to build curriculum"),
        ),
        llm: Arc::clone(&llm) as Arc<dyn LanguageModel>,
        synthesizer: Arc::clone(&synthesizer) as Arc<dyn SpeechSynthesizer>,
        config,
    };

    (create_router(state), llm, synthesizer, dir)
}

async fn post_json(router: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("failed to build request"),
        )
        .await
        .expect("request failed")
}

async fn get(router: &Router, uri: &str) -> Response<Body> {
    router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri(uri)
                .body(Body::empty())
                .expect("failed to build request"),
        )
        .await
        .expect("request failed")
}

async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("body is not JSON")
}

/// Generate, listen, submit: the whole lesson in one sitting.
#[tokio::test]
async fn test_full_exercise_flow() {
    let (router, llm, synthesizer, _dir) = test_app();

    // Step 1: generate an exercise.
    let response = post_json(&router, "/api/chat", serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let generated = json_body(response).await;

    let data = &generated["data"];
    assert_eq!(data["multiple_choice_questions"].as_array().unwrap().len(), 3);
    assert_eq!(data["open_ended_questions"].as_array().unwrap().len(), 4);

    // The generation prompt was grounded on the curriculum.
    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("el mercado: comprar, pagar, precios"));

    // The synthesizer rendered the passage with the default voice.
    let requests = synthesizer.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].text, data["text"].as_str().unwrap());
    assert_eq!(requests[0].language, "es");
    assert!(requests[0].speaker_wav.ends_with("esp1.wav"));

    // Step 2: fetch the audio the response points at.
    let audio_url = generated["audio_url"].as_str().unwrap();
    assert_eq!(
        audio_url,
        format!("/api/audio/{}", generated["audio_id"].as_str().unwrap())
    );

    let response = get(&router, audio_url).await;
    assert_eq!(response.status(), StatusCode::OK);
    let audio = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read audio body");
    assert_eq!(audio.as_ref(), STUB_WAV);

    // Step 3: submit answers against the exercise we were issued.
    let response = post_json(
        &router,
        "/api/submit_answers",
        serde_json::json!({
            "exercise_data": data,
            "user_answers": {
                "mcq_answers": ["A", "B", "A"],
                "open_ended_answers": ["mercado", "pan", "tarde", "tarjeta"]
            }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let feedback = json_body(response).await;

    assert_eq!(
        feedback["feedback"]["mcq_feedback"].as_array().unwrap().len(),
        3
    );
    assert_eq!(
        feedback["feedback"]["open_ended_feedback"]
            .as_array()
            .unwrap()
            .len(),
        4
    );

    // One grading call per question, on top of the generation call.
    assert_eq!(llm.prompts().len(), 8);
}

/// A topic override replaces the curriculum as grounding.
#[tokio::test]
async fn test_topic_override_changes_grounding() {
    let (router, llm, _synthesizer, _dir) = test_app();

    let response = post_json(
        &router,
        "/api/chat",
        serde_json::json!({ "text": "los animales de la granja" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let prompts = llm.prompts();
    assert!(prompts[0].contains("los animales de la granja"));
    assert!(!prompts[0].contains("el mercado"));
}

/// Misaligned submissions are rejected before any model call.
#[tokio::test]
async fn test_misaligned_submission_is_rejected_without_grading() {
    let (router, llm, _synthesizer, _dir) = test_app();

    let exercise: serde_json::Value =
        serde_json::from_str(&exercise_json()).expect("bad fixture");
    let response = post_json(
        &router,
        "/api/submit_answers",
        serde_json::json!({
            "exercise_data": exercise,
            "user_answers": {
                "mcq_answers": ["A", "B", "A"],
                "open_ended_answers": ["mercado"]
            }
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("open-ended"));

    // Nothing reached the model.
    assert!(llm.prompts().is_empty());
}

/// Each generation gets its own artifact; earlier audio stays
/// fetchable.
#[tokio::test]
async fn test_concurrent_generations_do_not_clobber_audio() {
    let (router, _llm, _synthesizer, _dir) = test_app();

    let first = json_body(post_json(&router, "/api/chat", serde_json::json!({})).await).await;
    let second = json_body(post_json(&router, "/api/chat", serde_json::json!({})).await).await;

    assert_ne!(first["audio_id"], second["audio_id"]);

    // Both artifacts are still served.
    for generated in [&first, &second] {
        let response = get(&router, generated["audio_url"].as_str().unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

/// Requesting a voice that is not installed fails before any model or
/// synthesis call.
#[tokio::test]
async fn test_unknown_voice_is_rejected_up_front() {
    let (router, llm, synthesizer, _dir) = test_app();

    let response = post_json(
        &router,
        "/api/chat",
        serde_json::json!({ "speaker_wav": "nadie.wav" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(llm.prompts().is_empty());
    assert!(synthesizer.requests().is_empty());
}
