// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pre-warmed, project-unbound worker kept ready so the first request for
//! a new project doesn't pay full worker start-up latency.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jd_adapters::ProcessAdapter;
use jd_core::id::WorkerIdGen;
use jd_core::ClientInfo;
use tokio::net::UnixListener;
use tokio::time::timeout;
use tracing::info;

use crate::error::PoolError;
use crate::worker::Worker;
use crate::{env, error::WorkerError};

const CONTROL_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// At most one reserve worker exists at any quiescent moment.
#[derive(Default)]
pub struct ReserveSlot {
    slot: tokio::sync::Mutex<Option<Arc<Worker>>>,
}

impl ReserveSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detach and return the reserve worker, if one exists.
    pub async fn take(&self) -> Option<Arc<Worker>> {
        self.slot.lock().await.take()
    }

    pub async fn set(&self, worker: Arc<Worker>) {
        *self.slot.lock().await = Some(worker);
    }

    pub async fn is_present(&self) -> bool {
        self.slot.lock().await.is_some()
    }
}

/// Spawn a fresh, project-unbound worker: start the subprocess, accept its
/// control connection, and run one synthetic no-op client through it so
/// the per-client execution path has already run once before a real user
/// sees it.
pub async fn create_reserve_worker(
    adapter: &dyn ProcessAdapter,
    id_gen: &WorkerIdGen,
    runtime_dir: &Path,
) -> Result<Arc<Worker>, PoolError> {
    let worker = spawn_worker(adapter, id_gen, runtime_dir).await?;
    let dummy = ClientInfo::new(false, std::process::id(), "/".to_string(), vec![
        "-e".to_string(),
        "nothing".to_string(),
    ]);
    worker.start_client(dummy).await?;
    Ok(worker)
}

/// Spawn a worker subprocess, bind its dedicated control socket, and wait
/// for it to connect back.
pub async fn spawn_worker(
    adapter: &dyn ProcessAdapter,
    id_gen: &WorkerIdGen,
    runtime_dir: &Path,
) -> Result<Arc<Worker>, PoolError> {
    let id = id_gen.next();
    let control_path = runtime_dir.join(format!("{id}-control.sock"));
    if control_path.exists() {
        let _ = std::fs::remove_file(&control_path);
    }
    let listener = UnixListener::bind(&control_path).map_err(WorkerError::Io)?;

    let executable = env::worker_executable();
    let mut args = env::worker_args();
    args.push(format!("--control-socket={}", control_path.display()));
    let env_vars = vec![("JULIA_DAEMON_WORKER_ID".to_string(), id.to_string())];

    let process = adapter.spawn(&executable, &args, &env_vars, None).await?;

    let (control, _addr) = timeout(CONTROL_CONNECT_TIMEOUT, listener.accept())
        .await
        .map_err(|_| WorkerError::Disconnected)?
        .map_err(WorkerError::Io)?;
    let _ = std::fs::remove_file(&control_path);

    info!(worker = %id, "worker connected");
    Ok(Arc::new(Worker::new(id, process, control, None, Instant::now())))
}
