// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! jd-worker: one warm worker process, spawned and owned by `jdconductor`.
//!
//! Connects back to the conductor-chosen control socket named on its own
//! command line, then serves `ControlRequest`s off that connection until
//! the conductor closes it, a soft-exit leaves it idle, or its TTL
//! expires with no clients.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod control_loop;
mod env;
mod error;
mod evaluator;
mod namespace;
mod reference_evaluator;
mod session;
mod ttl;
mod worker_state;

use std::sync::Arc;

use tokio::net::UnixStream;
use tracing::{error, info};

use reference_evaluator::ReferenceEvaluator;
use worker_state::WorkerState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _log_guard = setup_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let control_path = match env::control_socket_path(&args) {
        Some(p) => p,
        None => {
            eprintln!("error: missing --control-socket=PATH");
            std::process::exit(1);
        }
    };

    let control = UnixStream::connect(&control_path).await.map_err(|e| {
        error!("failed to connect control socket {}: {e}", control_path.display());
        e
    })?;

    let state = Arc::new(WorkerState::new(Arc::new(ReferenceEvaluator), env::runtime_dir()));
    std::fs::create_dir_all(&state.runtime_dir).ok();

    info!(worker = env::worker_id().as_deref().unwrap_or("?"), "worker connected to conductor");

    tokio::spawn(ttl::run(state.clone(), env::worker_ttl()));

    control_loop::run(control, state).await;
    info!("worker exiting");
    Ok(())
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
