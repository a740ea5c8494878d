//! Carlink CLI - run one telemetry session and print decoded samples
//!
//! Stdin lines "1" and "0" toggle the collision flag sent back to the
//! peripheral; Ctrl-C stops the session cleanly.

mod cli;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use uuid::Uuid;

use carlink_ble::{CarSession, SessionConfig};
use carlink_core::SessionEvent;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = build_config(&cli)?;
    let (session, mut handle) = CarSession::new(config);
    let mut events = handle
        .take_events()
        .context("event receiver already taken")?;

    let session_task = tokio::spawn(session.run());

    let mut stdin_lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(SessionEvent::Sample(sample)) => {
                    println!("x: {:>8.3}  y: {:>8.3}", sample.x, sample.y);
                }
                Some(SessionEvent::StateChanged(state)) => {
                    info!(?state, "connection state");
                }
                Some(SessionEvent::Error(e)) => {
                    warn!("session error: {}", e);
                }
                None => break,
            },
            line = stdin_lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match line.trim() {
                    "1" => handle.set_collision(true),
                    "0" => handle.set_collision(false),
                    "" => {}
                    other => warn!("unrecognized input {:?}, expected 1 or 0", other),
                },
                // Stdin closed; keep streaming samples.
                Ok(None) => stdin_open = false,
                Err(e) => {
                    warn!("stdin read failed: {}", e);
                    stdin_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("stopping session");
                handle.stop();
            }
        }
    }

    session_task.await.context("session task panicked")?;
    info!("carlink exited");
    Ok(())
}

/// Setup logging based on verbosity level
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();
}

/// Translate CLI arguments into a session configuration
fn build_config(cli: &Cli) -> anyhow::Result<SessionConfig> {
    let mut config = SessionConfig::default()
        .with_device_name(cli.name.clone())
        .with_connect_timeout(Duration::from_secs(cli.timeout_secs));

    if let Some(uuid) = &cli.service_uuid {
        config = config.with_service_uuid(
            Uuid::parse_str(uuid).with_context(|| format!("invalid service UUID {uuid:?}"))?,
        );
    }
    if let Some(uuid) = &cli.characteristic_uuid {
        config = config.with_characteristic_uuid(
            Uuid::parse_str(uuid)
                .with_context(|| format!("invalid characteristic UUID {uuid:?}"))?,
        );
    }
    Ok(config)
}
