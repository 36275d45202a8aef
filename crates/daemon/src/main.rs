// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! jdconductor: background process that pools warm worker processes and
//! brokers client invocations to them over Unix sockets.
//!
//! The daemon is typically started on demand by `juliaclient` and should
//! not be invoked directly.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::sync::Arc;

use jd_daemon::lifecycle::{self, Config, LifecycleError, StartupResult};
use jd_daemon::{env, listener, reserve};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-v" => {
                println!("jdconductor {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => {
                eprintln!("error: unexpected argument '{other}'");
                eprintln!("Usage: jdconductor [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let _log_guard = setup_logging();
    let config = Config::load();

    let StartupResult { conductor, listener: unix_listener } = match lifecycle::startup(config).await {
        Ok(r) => r,
        Err(LifecycleError::LockFailed(_)) => {
            eprintln!("jdconductor is already running");
            std::process::exit(1);
        }
        Err(e) => {
            error!("failed to start conductor: {e}");
            return Err(e.into());
        }
    };

    info!("conductor ready");
    let conductor = Arc::new(conductor);

    tokio::spawn(prewarm_reserve(conductor.clone()));

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        () = listener::run(unix_listener, conductor.clone()) => {}
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    conductor.shutdown().await?;
    info!("conductor stopped");
    Ok(())
}

/// Pre-warm the reserve slot in the background so the daemon is ready to
/// serve its first request without waiting on a fresh worker spawn.
async fn prewarm_reserve(conductor: Arc<lifecycle::Conductor>) {
    match reserve::create_reserve_worker(
        conductor.process_adapter.as_ref(),
        &conductor.id_gen,
        &conductor.config.runtime_dir,
    )
    .await
    {
        Ok(worker) => conductor.reserve.set(worker).await,
        Err(e) => error!("failed to pre-warm reserve worker: {e}"),
    }
}

fn setup_logging() -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = env::log_filter()
        .and_then(|f| EnvFilter::try_new(f).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking)).init();
    guard
}

fn print_help() {
    println!("jdconductor {}", env!("CARGO_PKG_VERSION"));
    println!("Pools warm language worker processes and brokers client sessions.");
    println!();
    println!("The daemon is typically started on demand by `juliaclient` and");
    println!("should not be invoked directly. It listens on a Unix socket for");
    println!("the client handshake described in the project's wire protocol.");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}
