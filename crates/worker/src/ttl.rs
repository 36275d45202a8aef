// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Idle self-exit: if nothing has happened to this worker for a full TTL
//! window, and it is not currently serving anyone, it exits on its own
//! rather than waiting for the conductor to notice and kill it.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::worker_state::WorkerState;

/// Runs until the process exits. A TTL of zero disables this entirely
/// (the worker only ever exits via `SoftExit` or the conductor killing it).
pub async fn run(state: Arc<WorkerState>, ttl: Duration) {
    if ttl.is_zero() {
        return;
    }

    let mut last_generation = state.generation();
    loop {
        tokio::time::sleep(ttl).await;
        let current_generation = state.generation();
        if current_generation == last_generation && state.client_count() == 0 {
            info!("worker idle for {ttl:?}, exiting");
            std::process::exit(0);
        }
        last_generation = current_generation;
    }
}
