// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown.

mod startup;
pub use startup::{startup, StartupResult};

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use jd_adapters::ProcessAdapter;
use jd_core::id::WorkerIdGen;
use jd_wire::EnvCache;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

use crate::pool::WorkerPool;
use crate::reserve::ReserveSlot;

/// Conductor configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub runtime_dir: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let runtime_dir = crate::env::runtime_dir();
        Self {
            socket_path: crate::env::server_path(),
            lock_path: runtime_dir.join("conductor.pid"),
            runtime_dir,
        }
    }
}

/// The conductor's owned, process-wide state.
pub struct Conductor {
    pub config: Config,
    // Held to maintain the exclusive lock; released on drop.
    #[allow(dead_code)]
    lock_file: File,
    pub pool: WorkerPool,
    pub reserve: ReserveSlot,
    pub env_cache: EnvCache,
    pub id_gen: WorkerIdGen,
    pub process_adapter: Arc<dyn ProcessAdapter>,
}

impl Conductor {
    pub fn new(config: Config, lock_file: File, process_adapter: Arc<dyn ProcessAdapter>) -> Self {
        Self {
            config,
            lock_file,
            pool: WorkerPool::new(),
            reserve: ReserveSlot::new(),
            env_cache: EnvCache::default(),
            id_gen: WorkerIdGen::new(),
            process_adapter,
        }
    }

    /// Kill every worker (including the reserve) and remove the main
    /// socket file.
    pub async fn shutdown(&self) -> Result<(), LifecycleError> {
        info!("conductor shutting down");
        let killed = self.pool.kill_all();
        if let Some(reserve) = self.reserve.take().await {
            reserve.kill();
        }
        info!(killed, "killed resident workers");

        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!("failed to remove socket file: {e}");
            }
        }
        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("failed to remove lock file: {e}");
            }
        }
        Ok(())
    }
}

/// Remove a stale socket file and bind fresh. Binding is deliberately the
/// last step of startup: it's the signal that the conductor is ready.
pub(crate) fn bind_socket(path: &PathBuf) -> Result<UnixListener, LifecycleError> {
    if path.exists() {
        std::fs::remove_file(path).map_err(LifecycleError::Io)?;
    }
    UnixListener::bind(path).map_err(|e| LifecycleError::BindFailed(path.clone(), e))
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine runtime directory")]
    NoRuntimeDir,

    #[error("failed to acquire lock: conductor already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
