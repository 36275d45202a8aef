// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;

use fs2::FileExt;
use jd_adapters::{ProcessAdapter, RealProcessAdapter};
use tokio::net::UnixListener;
use tracing::info;

use super::{bind_socket, Conductor, Config, LifecycleError};

pub struct StartupResult {
    pub conductor: Conductor,
    pub listener: UnixListener,
}

/// Bring up the conductor: acquire the exclusive lock, create the runtime
/// directory, and bind the main socket only once everything else has
/// succeeded. On any failure after the lock is held, best-effort cleanup
/// removes anything this call created.
pub async fn startup(config: Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(&config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            cleanup_on_failure(&config);
            Err(e)
        }
    }
}

async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.runtime_dir)?;

    let mut lock_file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;
    lock_file.set_len(0)?;
    write!(lock_file, "{}", std::process::id())?;

    // Socket bind happens last: it's the signal to clients that the
    // conductor is ready to accept connections.
    let listener = bind_socket(&config.socket_path)?;

    let process_adapter: Arc<dyn ProcessAdapter> = Arc::new(RealProcessAdapter);
    let conductor = Conductor::new(config.clone(), lock_file, process_adapter);

    info!(socket = %config.socket_path.display(), "conductor ready");
    Ok(StartupResult { conductor, listener })
}

fn cleanup_on_failure(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}
