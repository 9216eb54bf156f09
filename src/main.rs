//! Arena Duel - headless match runner
//!
//! Plays one best-of-three match between two seeded AI fighters in real time:
//! - frames are driven by a tokio interval at the configured rate
//! - round and match transitions are logged through tracing
//! - the final match summary is printed to stdout as JSON

use std::sync::Arc;

use tokio::sync::Notify;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arena_duel::config::Config;
use arena_duel::game::{AiController, GameMatch, Opponent, RunConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level, config.log_json);

    info!(
        seed = config.seed,
        p1 = %config.p1_difficulty,
        p2 = %config.p2_difficulty,
        frame_tps = config.frame_tps,
        "Starting Arena Duel"
    );

    let game = GameMatch::new(Opponent::Cpu(config.p2_difficulty), config.seed);
    info!(match_id = %game.id(), "Match created");
    let mut p1 = AiController::seeded(config.p1_difficulty, config.seed.wrapping_add(1));

    let shutdown = Arc::new(Notify::new());
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let run_config = RunConfig {
        frame_tps: config.frame_tps,
        snapshot_tps: config.snapshot_tps,
        max_duration: config.max_duration,
        ..RunConfig::default()
    };

    let stats = game.run(&mut p1, run_config, shutdown).await;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    info!("Runner shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

/// Notify the match loop on Ctrl+C or SIGTERM
async fn shutdown_signal(shutdown: Arc<Notify>) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, stopping match");
        }
        _ = terminate => {
            info!("Received terminate signal, stopping match");
        }
    }

    shutdown.notify_one();
}
