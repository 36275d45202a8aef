// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker's control connection: a single serial stream of
//! `ControlRequest`s from the conductor, each handled to completion
//! before the next is read (the conductor enforces this from its side
//! too, under the worker's mutex, but the worker does not rely on that).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use jd_wire::{read_control, write_control, ControlRequest, ControlResponse};
use tokio::net::{UnixListener, UnixStream};
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use crate::session;
use crate::worker_state::WorkerState;

/// How long a freshly minted session socket pair waits for the client to
/// connect before the worker gives up and treats it as abandoned (the
/// reserve warm-up's synthetic client never connects at all).
const SESSION_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Drive one worker's control connection until the conductor closes it
/// or a `SoftExit` leaves the worker idle, at which point the process
/// exits directly (matching §4.3's "no graceful-drain handshake" note).
pub async fn run(mut control: UnixStream, state: Arc<WorkerState>) {
    loop {
        let request: ControlRequest = match read_control(&mut control).await {
            Ok(r) => r,
            Err(e) => {
                info!("control connection closed: {e}");
                return;
            }
        };

        match request {
            ControlRequest::Client(info) => {
                if let Err(e) = handle_client(&mut control, &state, info).await {
                    warn!("failed to start session: {e}");
                }
            }
            ControlRequest::Eval(expr) => {
                // `client_count` is a conductor-only query, not evaluator
                // syntax: the worker is the sole source of truth for its
                // own live session count (see `pool::find_available`).
                let result = if expr == "client_count" {
                    state.client_count().to_string()
                } else {
                    match state.eval_top_level(&expr) {
                        Ok(outcome) => outcome.display().unwrap_or_default(),
                        Err(e) => {
                            warn!("top-level eval failed: {e}");
                            String::new()
                        }
                    }
                };
                if let Err(e) = write_control(&mut control, &ControlResponse::EvalResult(result)).await {
                    warn!("failed to reply to eval: {e}");
                    return;
                }
            }
            ControlRequest::SoftExit => {
                state.request_soft_exit();
                if state.client_count() == 0 {
                    std::process::exit(0);
                }
            }
        }
    }
}

async fn handle_client(
    control: &mut UnixStream,
    state: &Arc<WorkerState>,
    info: jd_core::ClientInfo,
) -> Result<(), crate::error::WorkerError> {
    let token = Uuid::new_v4();
    let stdio_path = state.runtime_dir.join(format!("session-{token}-stdio.sock"));
    let signals_path = state.runtime_dir.join(format!("session-{token}-signals.sock"));

    let stdio_listener = bind_fresh(&stdio_path)?;
    let signals_listener = bind_fresh(&signals_path)?;

    write_control(
        control,
        &ControlResponse::Socket { kind: "stdio".to_string(), path: stdio_path.display().to_string() },
    )
    .await?;
    write_control(
        control,
        &ControlResponse::Socket { kind: "signals".to_string(), path: signals_path.display().to_string() },
    )
    .await?;

    let state = state.clone();
    tokio::spawn(async move {
        accept_and_run(stdio_listener, stdio_path, signals_listener, signals_path, state, info).await;
    });

    Ok(())
}

fn bind_fresh(path: &Path) -> std::io::Result<UnixListener> {
    if path.exists() {
        let _ = std::fs::remove_file(path);
    }
    UnixListener::bind(path)
}

/// Accept both session sockets and run the session. If nothing connects
/// within the timeout (the reserve warm-up's synthetic "dummy client",
/// or a real client that gave up), the switches still run once against
/// a socket-less namespace so the dispatch path is exercised, then the
/// listener sockets are removed either way.
async fn accept_and_run(
    stdio_listener: UnixListener,
    stdio_path: PathBuf,
    signals_listener: UnixListener,
    signals_path: PathBuf,
    state: Arc<WorkerState>,
    info: jd_core::ClientInfo,
) {
    let accepted = timeout(SESSION_CONNECT_TIMEOUT, async {
        let (stdio, _) = stdio_listener.accept().await?;
        let (signals, _) = signals_listener.accept().await?;
        Ok::<_, std::io::Error>((stdio, signals))
    })
    .await;

    let _ = std::fs::remove_file(&stdio_path);
    let _ = std::fs::remove_file(&signals_path);

    match accepted {
        Ok(Ok((stdio, signals))) => {
            session::run_session(info, state, stdio, signals).await;
        }
        Ok(Err(e)) => warn!("session socket accept failed: {e}"),
        Err(_) => {
            info!("no client connected for session, running switches against a detached namespace");
            session::run_detached(info, &state).await;
        }
    }
}
