//! Escucha CLI
//!
//! Main entry point for the listening-exercise backend: loads the
//! curriculum, wires the model and synthesis clients and serves the
//! HTTP API.

use std::net::SocketAddr;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use escucha_llm::{summarize_curriculum, ChatClient, LanguageModel};
use escucha_server::{create_router, AppState, AudioStore, Config, Curriculum};
use escucha_tts::XttsEngine;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Default port for the HTTP API server.
const DEFAULT_PORT: u16 = 8000;

/// Escucha - Listening Comprehension Exercise Server
///
/// Generates listening-comprehension exercises from a curriculum PDF,
/// renders them to audio and grades submitted answers.
#[derive(Parser, Debug)]
#[command(name = "escucha")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the curriculum PDF (overrides the config file)
    #[arg(value_name = "CURRICULUM")]
    curriculum: Option<String>,

    /// Path to configuration file (default: escucha.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Directory holding reference voice samples
    #[arg(long, value_name = "DIR")]
    voices_dir: Option<String>,

    /// Summarize the curriculum once at startup and ground exercises on
    /// the summary
    #[arg(long)]
    summarize: bool,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,

    /// Port for the HTTP API server
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing subscriber with appropriate filter
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Escucha starting");
    tracing::debug!(config = ?args.config, "Config file");

    match run_server(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Runs the Escucha server.
///
/// 1. Load config and apply CLI overrides
/// 2. Load the curriculum PDF (optionally summarizing it)
/// 3. Wire the model client, synthesis engine and audio store
/// 4. Serve the HTTP API until Ctrl+C
async fn run_server(args: Args) -> anyhow::Result<()> {
    // Load configuration
    let mut config = load_config(args.config.as_deref())?;

    // Apply CLI argument overrides
    if let Some(ref curriculum) = args.curriculum {
        config.curriculum.clone_from(curriculum);
    }
    if let Some(ref voices_dir) = args.voices_dir {
        config.voices_dir.clone_from(voices_dir);
    }
    if args.summarize {
        config.summarize_on_start = true;
    }

    // Re-validate after overrides
    config.validate()?;

    print_config(&config);

    // Build the model client up front; summarization may need it before
    // the server starts.
    let api_key = std::env::var(&config.llm.api_key_env)
        .ok()
        .filter(|key| !key.trim().is_empty());
    if api_key.is_none() {
        tracing::warn!(
            var = %config.llm.api_key_env,
            "API key variable unset or empty, requests go out unauthenticated"
        );
    }
    let llm: Arc<dyn LanguageModel> = Arc::new(ChatClient::new(
        &config.llm.base_url,
        &config.llm.model,
        api_key,
        Duration::from_secs(config.llm.timeout_secs),
    ));

    // Load the curriculum
    tracing::info!(curriculum = %config.curriculum, "Loading curriculum");
    let mut curriculum = Curriculum::load(&config.curriculum)?;
    print_curriculum_info(&curriculum);

    if config.summarize_on_start {
        println!();
        println!("Summarizing curriculum...");
        let summary = summarize_curriculum(llm.as_ref(), &curriculum.content).await?;
        tracing::info!(
            original_chars = curriculum.content.len(),
            summary_chars = summary.len(),
            "Curriculum summarized"
        );
        curriculum = Curriculum::from_text(curriculum.path.clone(), &summary)?;
        println!("Summary ready ({} characters)", curriculum.content.len());
    }

    let synthesizer = Arc::new(XttsEngine::new(
        &config.tts.base_url,
        Duration::from_secs(config.tts.timeout_secs),
    ));
    let audio = Arc::new(AudioStore::new(&config.audio_dir)?);

    let state = AppState {
        config,
        curriculum: Arc::new(curriculum),
        llm,
        synthesizer,
        audio,
    };
    let router = create_router(state);

    // Serve until Ctrl+C
    let addr: SocketAddr = ([0, 0, 0, 0], args.port).into();
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {addr}: {e}\n\nSuggestion: Try a different port with --port"
        )
    })?;

    println!();
    println!("Escucha API server running on http://{addr}");
    println!("Press Ctrl+C to stop");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Completes when Ctrl+C is received.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        return;
    }
    tracing::info!("Received Ctrl+C, shutting down");
}

/// Loads configuration from the specified path or default location.
fn load_config(config_path: Option<&str>) -> anyhow::Result<Config> {
    match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Config::load_from_file(path).map_err(|e| anyhow::anyhow!("{e}"))
        }
        None => Config::load().map_err(|e| anyhow::anyhow!("{e}")),
    }
}

/// Prints the loaded configuration.
fn print_config(config: &Config) {
    println!("Configuration loaded:");
    println!("  Curriculum: {}", config.curriculum);
    println!("  Voices directory: {}", config.voices_dir);
    println!("  Audio directory: {}", config.audio_dir);
    println!("  Model: {} @ {}", config.llm.model, config.llm.base_url);
    println!("  Synthesis server: {}", config.tts.base_url);
    println!("  Default language: {}", config.tts.default_language);
    println!("  Summarize on start: {}", config.summarize_on_start);
}

/// Prints curriculum information.
fn print_curriculum_info(curriculum: &Curriculum) {
    println!();
    println!("Curriculum loaded:");
    println!("  Path: {}", curriculum.path.display());
    println!("  Size: {} bytes", curriculum.size_bytes);
    println!("  Extracted text: {} characters", curriculum.content.len());
}
