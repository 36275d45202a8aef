// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! juliaclient: the client-side terminal multiplexer. Connects to the
//! conductor, completes the handshake, and pumps stdin/stdout/stderr and
//! out-of-band signals between the user's terminal and a worker session.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod env;
mod exit_error;
mod multiplexer;

use std::io::IsTerminal;

use anyhow::Context;
use jd_adapters::RawModeGuard;
use jd_core::env_fingerprint::{fingerprint, DEFAULT_EXCLUDED_PREFIX};
use jd_wire::{
    read_handshake_ack, read_socket_paths, write_env_pairs, write_handshake, HandshakeAck, HandshakeFields,
    SocketPaths,
};
use tokio::net::UnixStream;
use tracing_subscriber::EnvFilter;

use exit_error::ExitError;

#[tokio::main]
async fn main() {
    setup_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let code = match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("juliaclient: {e:#}");
            1
        }
    };
    std::process::exit(code);
}

/// Stages 0-3: everything up to "two sockets ready to pump". Left as
/// `anyhow::Result` since every failure here is equally fatal (exit 1)
/// and the caller only needs the message, not a distinct code.
async fn handshake(args: &[String]) -> anyhow::Result<(UnixStream, UnixStream)> {
    let server_path = env::server_path();
    let mut conn = UnixStream::connect(&server_path)
        .await
        .with_context(|| format!("could not connect to conductor at {}", server_path.display()))?;

    let tty = std::io::stdin().is_terminal();
    let cwd = std::env::current_dir().context("could not resolve cwd")?.display().to_string();
    let all_env: Vec<(String, String)> = std::env::vars().collect();
    let env_fingerprint = fingerprint(&all_env, DEFAULT_EXCLUDED_PREFIX);

    let fields =
        HandshakeFields { tty, pid: std::process::id(), cwd, env_fingerprint, args: args.to_vec() };
    write_handshake(&mut conn, &fields).await.context("handshake send failed")?;

    let ack = read_handshake_ack(&mut conn).await.context("handshake reply failed")?;
    let paths = match ack {
        HandshakeAck::SocketPaths(paths) => paths,
        HandshakeAck::CacheMiss => {
            write_env_pairs(&mut conn, &all_env).await.context("env send failed")?;
            read_socket_paths(&mut conn).await.context("socket-paths read failed")?
        }
    };
    drop(conn);

    let SocketPaths { stdio_path, signals_path } = paths;
    let stdio = UnixStream::connect(&stdio_path)
        .await
        .with_context(|| format!("could not connect to stdio socket {stdio_path}"))?;
    let signals = UnixStream::connect(&signals_path)
        .await
        .with_context(|| format!("could not connect to signals socket {signals_path}"))?;
    Ok((stdio, signals))
}

async fn run(args: Vec<String>) -> anyhow::Result<i32> {
    // Stage 0: raw mode for the duration of the session.
    let _raw_guard = RawModeGuard::enable().context("raw mode failed")?;

    let (stdio, signals) = handshake(&args).await?;

    // Stage 4: pump until exit.
    match multiplexer::run(stdio, signals).await {
        Ok(code) => Ok(code),
        Err(ExitError { code, message }) => {
            eprintln!("juliaclient: {message}");
            Ok(code)
        }
    }
}

fn setup_logging() {
    let filter = env::log_filter()
        .and_then(|f| EnvFilter::try_new(f).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}
