// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The conductor's main accept loop.
//!
//! Deliberately sequential: `serve_once` handles one connection inline and
//! returns, rather than spawning a task per connection. A per-connection
//! `tokio::spawn` adds roughly 10ms of latency, which dominates a "hello
//! world" invocation — the opposite trade-off from a long-lived IPC
//! daemon, where spawning is free by comparison.

mod canned;

use std::path::Path;
use std::sync::Arc;

use jd_core::project::resolve_project;
use jd_core::{ClientInfo, Switches};
use jd_wire::{read_env_pairs, read_handshake, write_cache_miss_sentinel, write_socket_paths, SocketPaths};
use thiserror::Error;
use tokio::net::{UnixListener, UnixStream};
use tracing::{error, warn};

use crate::lifecycle::Conductor;
use crate::{env, reserve};

const VERSION_BANNER: &str = concat!("julia-daemon conductor ", env!("CARGO_PKG_VERSION"));
const HELP_TEXT: &str = "\n    juliaclient [switches] [programfile] [args...]\n";

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] jd_wire::ProtocolError),

    #[error("worker pool error: {0}")]
    Pool(#[from] crate::error::PoolError),

    #[error("worker error: {0}")]
    Worker(#[from] crate::error::WorkerError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the sequential accept loop until the listener is closed.
pub async fn run(listener: UnixListener, conductor: Arc<Conductor>) {
    loop {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                if let Err(e) = serve_once(stream, &conductor).await {
                    warn!("connection handling failed: {e}");
                }
            }
            Err(e) => {
                error!("accept failed: {e}");
            }
        }
    }
}

async fn serve_once(mut stream: UnixStream, conductor: &Arc<Conductor>) -> Result<(), ConnectionError> {
    let fields = read_handshake(&mut stream).await?;
    let switches = Switches::parse(&fields.args);

    let env_pairs = match conductor.env_cache.get(fields.env_fingerprint) {
        Some(env) => env,
        None => {
            write_cache_miss_sentinel(&mut stream).await?;
            let env = read_env_pairs(&mut stream).await?;
            conductor.env_cache.insert(fields.env_fingerprint, env.clone());
            env
        }
    };

    let info = ClientInfo {
        tty: fields.tty,
        pid: fields.pid,
        cwd: fields.cwd,
        env_fingerprint: fields.env_fingerprint,
        env: env_pairs,
        args: fields.args,
        switches,
    };

    if info.switches.contains("help") {
        return reply_canned(&mut stream, conductor, HELP_TEXT, 0).await;
    }
    if info.switches.contains("version") {
        return reply_canned(&mut stream, conductor, &format!("{VERSION_BANNER}\n"), 0).await;
    }
    if info.switches.contains("restart") {
        let project = resolve_project(&info, dirs_home().as_deref(), &default_user_project());
        let killed = conductor.pool.kill_bucket(&project);
        let text = format!("Reset: killed {killed} worker(s) for project\n");
        return reply_canned(&mut stream, conductor, &text, 0).await;
    }

    dispatch_to_worker(&mut stream, conductor, info).await
}

async fn dispatch_to_worker(
    stream: &mut UnixStream,
    conductor: &Arc<Conductor>,
    info: ClientInfo,
) -> Result<(), ConnectionError> {
    let project = resolve_project(&info, dirs_home().as_deref(), &default_user_project());
    let worker = acquire_worker(conductor, &project).await?;

    let (stdio_path, signals_path) = worker.start_client(info).await?;
    write_socket_paths(stream, &SocketPaths { stdio_path, signals_path }).await?;
    Ok(())
}

/// Pool lookup per the conductor's dispatch algorithm: purge dead workers,
/// reuse one with spare capacity, fall back to the reserve (binding it to
/// this project and spawning its replacement), or spawn fresh.
async fn acquire_worker(
    conductor: &Arc<Conductor>,
    project: &Path,
) -> Result<Arc<crate::worker::Worker>, ConnectionError> {
    conductor.pool.purge_dead(project);

    if let Some(worker) = conductor.pool.find_available(project, env::worker_maxclients()).await {
        return Ok(worker);
    }

    let worker = if let Some(reserve) = conductor.reserve.take().await {
        reserve.eval(&format!("set_project({:?})", project.display().to_string())).await?;
        reserve.bind_project(project.to_path_buf());

        // Replacement reserve is spawned in the background; this lookup
        // must not wait on it.
        let conductor = conductor.clone();
        tokio::spawn(async move {
            match reserve::create_reserve_worker(
                conductor.process_adapter.as_ref(),
                &conductor.id_gen,
                &conductor.config.runtime_dir,
            )
            .await
            {
                Ok(fresh) => conductor.reserve.set(fresh).await,
                Err(e) => warn!("failed to spawn replacement reserve worker: {e}"),
            }
        });
        reserve
    } else {
        let worker = reserve::spawn_worker(
            conductor.process_adapter.as_ref(),
            &conductor.id_gen,
            &conductor.config.runtime_dir,
        )
        .await?;
        worker.bind_project(project.to_path_buf());
        worker
    };

    conductor.pool.insert(project.to_path_buf(), worker.clone());
    Ok(worker)
}

async fn reply_canned(
    stream: &mut UnixStream,
    conductor: &Conductor,
    text: &str,
    exit_code: i32,
) -> Result<(), ConnectionError> {
    let paths = canned::serve_text(&conductor.config.runtime_dir, text.to_string(), exit_code).await?;
    write_socket_paths(stream, &paths).await?;
    Ok(())
}

fn dirs_home() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME").map(std::path::PathBuf::from)
}

fn default_user_project() -> std::path::PathBuf {
    match dirs_home() {
        Some(home) => home.join(".julia").join("environments").join("v1"),
        None => std::path::PathBuf::from("/tmp/julia-daemon-default-project"),
    }
}
