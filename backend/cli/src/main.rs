mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use formlens_core::FeedbackStore;
use formlens_extraction::GeminiExtractor;
use formlens_gateway::{build_router, AppState};
use formlens_gauth::{scopes, TokenProvider};
use formlens_pipeline::{FeedbackListing, UploadPipeline};
use formlens_sheets::GoogleSheetMirror;
use formlens_storage::{FirebaseObjectStore, FirestoreStore};

use config::Config;

#[derive(Parser)]
#[command(name = "formlens")]
#[command(about = "FormLens — OCR backend for paper feedback forms")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the FormLens HTTP server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show current server status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let config = Config::from_env()?;
            let config = Config {
                port: port.unwrap_or(config.port),
                ..config
            };
            run_server(config).await?;
        }
        Commands::Status => {
            let port = Config::port_from_env();
            let client = reqwest::Client::new();
            match client
                .get(format!("http://localhost:{port}/api/health"))
                .send()
                .await
            {
                Ok(resp) => {
                    let body: serde_json::Value = resp.json().await?;
                    println!("{}", serde_json::to_string_pretty(&body)?);
                }
                Err(_) => {
                    println!("FormLens is not running on port {port}");
                }
            }
        }
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    info!(
        port = config.port,
        bind = %config.bind_address,
        project = %config.project_id,
        bucket = %config.storage_bucket,
        model = %config.gemini_model,
        "Starting FormLens backend"
    );

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()
        .context("failed to build HTTP client")?;

    // One token per credential: the Firebase key covers Firestore and
    // Storage, the Sheets key covers only the spreadsheet.
    let firebase_token = Arc::new(TokenProvider::new(
        client.clone(),
        config.firebase_key.clone(),
        &[scopes::DATASTORE, scopes::STORAGE_READ_WRITE],
    ));
    let sheets_token = Arc::new(TokenProvider::new(
        client.clone(),
        config.sheets_key.clone(),
        &[scopes::SPREADSHEETS],
    ));

    let objects = Arc::new(FirebaseObjectStore::new(
        client.clone(),
        firebase_token.clone(),
        config.storage_bucket.clone(),
    ));
    let extractor = Arc::new(
        GeminiExtractor::new(client.clone(), config.gemini_api_key.clone())
            .with_model(config.gemini_model.clone()),
    );
    let store = Arc::new(FirestoreStore::new(
        client.clone(),
        firebase_token,
        config.project_id.clone(),
    ));
    let sheet = Arc::new(GoogleSheetMirror::new(
        client,
        sheets_token,
        config.sheet_id.clone(),
    ));

    // Create the feedback collection marker up front so the first upload
    // does not race collection creation. On failure the server still
    // starts; requests return 503 until the backend is provisioned.
    if let Err(e) = store.ensure_ready().await {
        error!(error = %e, "Feedback store initialization failed");
    }

    let pipeline = UploadPipeline::new(objects, extractor, store.clone(), sheet);
    let listing = FeedbackListing::new(store);
    let state = Arc::new(AppState::new(pipeline, listing));

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());
    let addr = format!("{}:{}", config.bind_address, config.port);

    info!(addr = %addr, "HTTP API listening");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
