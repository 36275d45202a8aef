// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conductor-served replies that don't need a worker: `--help`,
//! `--version`, and `--restart`'s summary line. The conductor mints a
//! throwaway stdio/signals socket pair, writes the text and an exit
//! signal frame, then removes the socket files once read.

use std::path::PathBuf;
use std::time::Duration;

use jd_wire::{SignalFrame, SocketPaths};
use tokio::io::AsyncWriteExt;
use tokio::net::UnixListener;
use tokio::time::timeout;
use tracing::warn;

/// How long a canned reply's sockets wait for the client to connect
/// before the serving task gives up (the client may have already exited
/// after reading the socket paths, or never connected at all).
const CANNED_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Bind ephemeral stdio and signals sockets under `runtime_dir`, spawn a
/// background task that serves `text` followed by an exit signal once a
/// client connects to each, and return the paths for the conductor to
/// hand back over the main handshake socket.
pub async fn serve_text(
    runtime_dir: &std::path::Path,
    text: String,
    exit_code: i32,
) -> std::io::Result<SocketPaths> {
    let token = uuid::Uuid::new_v4();
    let stdio_path = runtime_dir.join(format!("canned-{token}-stdio.sock"));
    let signals_path = runtime_dir.join(format!("canned-{token}-signals.sock"));

    let stdio_listener = bind_fresh(&stdio_path)?;
    let signals_listener = bind_fresh(&signals_path)?;

    tokio::spawn(serve_stdio(stdio_listener, stdio_path.clone(), text));
    tokio::spawn(serve_signals(signals_listener, signals_path.clone(), exit_code));

    Ok(SocketPaths {
        stdio_path: stdio_path.display().to_string(),
        signals_path: signals_path.display().to_string(),
    })
}

fn bind_fresh(path: &PathBuf) -> std::io::Result<UnixListener> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    UnixListener::bind(path)
}

async fn serve_stdio(listener: UnixListener, path: PathBuf, text: String) {
    match timeout(CANNED_CONNECT_TIMEOUT, listener.accept()).await {
        Ok(Ok((mut stream, _))) => {
            if let Err(e) = stream.write_all(text.as_bytes()).await {
                warn!("failed to write canned reply: {e}");
            }
        }
        Ok(Err(e)) => warn!("canned stdio accept failed: {e}"),
        Err(_) => warn!("canned stdio socket timed out waiting for a client to connect"),
    }
    let _ = std::fs::remove_file(&path);
}

async fn serve_signals(listener: UnixListener, path: PathBuf, exit_code: i32) {
    match timeout(CANNED_CONNECT_TIMEOUT, listener.accept()).await {
        Ok(Ok((mut stream, _))) => {
            let frame = SignalFrame::exit(exit_code);
            if let Err(e) = stream.write_all(&frame.encode()).await {
                warn!("failed to write canned exit signal: {e}");
            }
        }
        Ok(Err(e)) => warn!("canned signals accept failed: {e}"),
        Err(_) => warn!("canned signals socket timed out waiting for a client to connect"),
    }
    let _ = std::fs::remove_file(&path);
}
