//! pubsub-bridge
//!
//! Accepts HTTP requests on `/pubsub` and republishes each request body as a
//! message on a single Google Cloud Pub/Sub topic.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                 PUBSUB BRIDGE                │
//!                         │                                              │
//!   Client Request        │  ┌──────────┐   ┌───────────┐   ┌─────────┐  │
//!   ──────────────────────┼─▶│  server  │──▶│  handler  │──▶│publisher│──┼──▶ Pub/Sub
//!                         │  │root span │   │read body  │   │ (REST)  │  │
//!   200 / 500             │  └──────────┘   └───────────┘   └─────────┘  │
//!   ◀─────────────────────┼──────────────────────┘  pubsub child span    │
//!                         │                                              │
//!                         │  config · observability · lifecycle          │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use pubsub_bridge::config::load_config;
use pubsub_bridge::lifecycle;
use pubsub_bridge::observability::init_telemetry;

#[derive(Parser)]
#[command(name = "pubsub-bridge")]
#[command(about = "Republish HTTP request bodies to a Google Cloud Pub/Sub topic", long_about = None)]
struct Cli {
    /// Optional TOML file; environment variables override its values.
    #[arg(short, long, env = "BRIDGE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Nothing is bound until configuration is complete.
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("pubsub-bridge: {}", e);
            std::process::exit(1);
        }
    };

    let telemetry = init_telemetry(&config.tracing, &config.observability)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        topic = %config.pubsub.topic,
        emulator = config.pubsub.emulator_host.is_some(),
        max_body_bytes = config.limits.max_body_bytes,
        "Configuration loaded"
    );

    let result = lifecycle::run(config).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Bridge exited with error");
    }

    telemetry.shutdown();
    result?;
    Ok(())
}
