// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! swarmd — runs one application's engine in the foreground.
//!
//! Architecture:
//! - Builds a `Manifest`/`Profile` from CLI flags
//! - Starts an `Engine` backed by `SubprocessGateway`, each slave exec'd as
//!   its own OS process
//! - Blocks on SIGINT/SIGTERM, then stops the engine gracefully before exit
//!
//! There is no client protocol here: wiring a real frontend (HTTP, a Unix
//! socket RPC, whatever the embedding application wants) to `EngineHandle`
//! is the caller's concern, same as `swarm-engine`'s own docs say.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use swarm_core::{Manifest, Profile};
use swarm_engine::{Engine, StopMode};
use swarm_isolate::SubprocessGateway;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

/// Run one application's slave engine.
#[derive(Parser)]
#[command(name = "swarmd", version, about = "Multi-tenant application engine")]
struct Cli {
    /// Name the application is registered under.
    #[arg(long)]
    app: String,

    /// Unix-domain socket the engine listens on for slave connections.
    #[arg(long)]
    listen: PathBuf,

    /// Executable spawned for each slave process.
    #[arg(long)]
    executable: PathBuf,

    /// Extra argument passed to the slave executable. May be repeated.
    #[arg(long = "arg")]
    args: Vec<String>,

    /// Extra `KEY=VALUE` environment variable set on the slave process. May be repeated.
    #[arg(long = "env", value_parser = parse_env)]
    env: Vec<(String, String)>,

    /// Maximum number of slave processes kept alive at once.
    #[arg(long, default_value_t = 4)]
    pool_limit: usize,

    /// Maximum number of sessions dispatched to one slave concurrently.
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Maximum number of sessions held in the pending queue before `enqueue` rejects with `queue_full`.
    #[arg(long, default_value_t = 1000)]
    queue_limit: usize,

    /// Idle slave lifetime before it is culled, in milliseconds.
    #[arg(long, default_value_t = 60_000)]
    idle_timeout_ms: u64,

    /// Max silence from a slave holding in-flight work before it is declared unresponsive, in milliseconds.
    #[arg(long, default_value_t = 30_000)]
    heartbeat_timeout_ms: u64,

    /// Max time a freshly spawned slave has to complete its handshake, in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    startup_timeout_ms: u64,

    /// Max time a slave has to exit after `Terminate` before it is force-killed, in milliseconds.
    #[arg(long, default_value_t = 5_000)]
    termination_timeout_ms: u64,
}

fn parse_env(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging();

    let manifest = Manifest::new(cli.app.clone(), cli.listen.clone(), cli.executable)
        .with_args(cli.args)
        .with_env(cli.env);
    let profile = Profile {
        pool_limit: cli.pool_limit,
        concurrency: cli.concurrency,
        queue_limit: cli.queue_limit,
        idle_timeout: Duration::from_millis(cli.idle_timeout_ms),
        heartbeat_timeout: Duration::from_millis(cli.heartbeat_timeout_ms),
        startup_timeout: Duration::from_millis(cli.startup_timeout_ms),
        termination_timeout: Duration::from_millis(cli.termination_timeout_ms),
        io_bulk_size: 100,
    };

    info!(app = %manifest.app_name, listen = %manifest.listen.display(), "starting engine");
    let engine = Engine::new(manifest, profile, Arc::new(SubprocessGateway::new())).context("failed to construct engine")?;
    let handle = engine.start();

    wait_for_shutdown_signal().await?;
    info!("shutdown signal received, draining");
    handle.stop(StopMode::Graceful).await;
    info!("engine stopped");
    Ok(())
}

async fn wait_for_shutdown_signal() -> Result<()> {
    let mut sigterm = signal(SignalKind::terminate()).context("installing SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("installing SIGINT handler")?;
    tokio::select! {
        _ = sigterm.recv() => {}
        _ = sigint.recv() => {}
    }
    Ok(())
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
