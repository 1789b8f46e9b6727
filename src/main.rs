use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vishing_guard::config::{NotifierBackendKind, RecognitionBackendKind};
use vishing_guard::{
    create_router, AlertTemplate, Analyzer, AppState, Config, Controller, ControllerConfig,
    GeminiClient, LineRecognizer, LogNotifier, NatsClient, NatsNotifier, NatsRecognizer, Notifier,
    Recognizer,
};

#[derive(Parser)]
#[command(name = "vishing-guard", version, about = "Listens to calls and flags voice phishing")]
struct Cli {
    /// Config file path (extension optional)
    #[arg(short, long, default_value = "config/vishing-guard")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the listening loop and its HTTP API
    Run,
    /// Classify a single transcript and print the result
    Analyze { text: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("Vishing Guard v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);

    match cli.command {
        Command::Run => run(cfg).await,
        Command::Analyze { text } => analyze(cfg, &text).await,
    }
}

async fn analyze(cfg: Config, text: &str) -> Result<()> {
    let client = GeminiClient::new(&cfg.analysis).context("Failed to create classifier client")?;
    let outcome = client.analyze(text).await;
    println!("{}", outcome.message());
    Ok(())
}

async fn run(cfg: Config) -> Result<()> {
    let needs_nats = cfg.recognition.backend == RecognitionBackendKind::Nats
        || cfg.notifier.backend == NotifierBackendKind::Nats;
    let nats = if needs_nats {
        Some(NatsClient::connect(&cfg.recognition.nats_url).await?)
    } else {
        None
    };

    let recognizer: Box<dyn Recognizer> = match (&cfg.recognition.backend, &nats) {
        (RecognitionBackendKind::Nats, Some(client)) => Box::new(NatsRecognizer::new(
            client.clone(),
            cfg.recognition.language.clone(),
            cfg.recognition.session_timeout(),
        )),
        _ => Box::new(LineRecognizer::stdin()),
    };

    let template = AlertTemplate {
        channel_id: cfg.notifier.channel_id.clone(),
        title: cfg.notifier.title.clone(),
    };
    let notifier: Arc<dyn Notifier> = match (&cfg.notifier.backend, &nats) {
        (NotifierBackendKind::Nats, Some(client)) => Arc::new(NatsNotifier::new(client.clone(), template)),
        _ => Arc::new(LogNotifier::new(template)),
    };

    let analyzer: Arc<dyn Analyzer> = Arc::new(
        GeminiClient::new(&cfg.analysis).context("Failed to create classifier client")?,
    );

    let controller = Controller::spawn(
        ControllerConfig::from(&cfg.controller),
        recognizer,
        analyzer,
        notifier,
    );

    if cfg.recognition.backend == RecognitionBackendKind::Stdin {
        // No button on the console: start listening right away
        controller.toggle_listening()?;
    }

    let app = create_router(AppState::new(controller.clone(), cfg.service.name.clone()));
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server to {}", addr))?;

    info!("HTTP API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await
        .context("HTTP server failed")?;

    controller.shutdown().await
}
