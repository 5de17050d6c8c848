//! Medgate CLI — the main entry point.
//!
//! Commands:
//! - `serve` — start the HTTP gateway
//! - `seed`  — populate the record store with the demo patient set
//! - `tools` — list the tool surface
//! - `ask`   — one-shot question about a patient through the full pipeline

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::warn;

use medgate_assistant::{AssistantBridge, OpenAiProvider};
use medgate_config::AppConfig;
use medgate_core::assistant::AssistantProvider;
use medgate_core::tool::ToolRegistry;
use medgate_gateway as gateway;
use medgate_security::{CredentialVerifier, DenyAllGate, SharedSecretGate};
use medgate_store::{SqliteStore, seed_demo};
use medgate_tools::{ToolPipeline, default_registry};

#[derive(Parser)]
#[command(
    name = "medgate",
    about = "Medgate — a scrubbing, minimal-context EHR gateway for LLM assistants",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Seed the record store with demo patients
    Seed,

    /// List the tool surface
    Tools,

    /// Ask the assistant about a patient
    Ask {
        /// The patient identifier
        patient_id: String,
        /// The question
        question: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = AppConfig::load().context("loading configuration")?;

    match cli.command {
        Commands::Serve { port } => {
            let registry = build_registry(&config).await?;
            let port = port.unwrap_or(config.gateway.port);
            gateway::start(&config.gateway.host, port, registry)
                .await
                .context("gateway server")?;
        }
        Commands::Seed => {
            let store = SqliteStore::new(&config.store.db_path).await?;
            seed_demo(&store).await?;
            println!("demo records seeded into {}", config.store.db_path);
        }
        Commands::Tools => {
            let registry = build_registry(&config).await?;
            for def in registry.definitions() {
                println!("{:<22} {}", def.name, def.description);
            }
        }
        Commands::Ask {
            patient_id,
            question,
        } => {
            let credential = config
                .shared_secret
                .clone()
                .context("shared_secret must be configured to use `ask`")?;
            let registry = build_registry(&config).await?;
            let payload = registry
                .execute(
                    "ask_about_patient",
                    serde_json::json!({
                        "patient_id": patient_id,
                        "question": question,
                        "credential": credential,
                    }),
                )
                .await?;
            println!(
                "{}",
                payload["answer"].as_str().unwrap_or_default()
            );
        }
    }

    Ok(())
}

/// Assemble the pipeline and tool registry from configuration.
async fn build_registry(config: &AppConfig) -> anyhow::Result<ToolRegistry> {
    let gate: Box<dyn CredentialVerifier> = match &config.shared_secret {
        Some(secret) => Box::new(SharedSecretGate::new(secret)),
        None => {
            warn!("no shared_secret configured; all requests will be denied");
            Box::new(DenyAllGate)
        }
    };

    let store = Arc::new(SqliteStore::new(&config.store.db_path).await?);

    let api_key = config.assistant.api_key.clone().unwrap_or_default();
    if api_key.is_empty() {
        warn!("no assistant API key configured; ask_about_patient will fail");
    }
    let provider: Arc<dyn AssistantProvider> = Arc::new(
        OpenAiProvider::new(api_key, config.assistant.model.clone())
            .with_base_url(config.assistant.base_url.clone()),
    );

    let bridge = AssistantBridge::new(provider.clone())
        .with_timeout(Duration::from_secs(config.assistant.timeout_secs))
        .with_max_attempts(config.assistant.max_attempts);

    let pipeline = Arc::new(ToolPipeline::new(gate, store, provider).with_bridge(bridge));
    Ok(default_registry(pipeline))
}
