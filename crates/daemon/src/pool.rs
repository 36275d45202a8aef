// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker pool: project-path-keyed buckets of workers.
//!
//! Invariants: a worker appears in at most one bucket; dead workers are
//! purged lazily on lookup; removing a bucket kills every worker in it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::worker::Worker;

#[derive(Default)]
pub struct WorkerPool {
    buckets: Mutex<HashMap<PathBuf, Vec<Arc<Worker>>>>,
}

impl WorkerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop any workers in `project`'s bucket whose process has exited.
    pub fn purge_dead(&self, project: &Path) {
        let mut buckets = self.buckets.lock();
        if let Some(workers) = buckets.get_mut(project) {
            let before = workers.len();
            workers.retain(|w| {
                let dead = w.is_dead();
                if dead {
                    warn!(worker = %w.id, project = %project.display(), "purging dead worker");
                }
                !dead
            });
            if workers.is_empty() {
                buckets.remove(project);
            } else if workers.len() != before {
                info!(project = %project.display(), remaining = workers.len(), "purged dead workers");
            }
        }
    }

    /// Find a worker in `project`'s bucket with spare capacity. `0` in
    /// `maxclients` means uncapped: the first worker is always reused.
    /// `client_count` is queried live over each candidate's control
    /// connection, so the lock is dropped before any `.await`.
    pub async fn find_available(&self, project: &Path, maxclients: usize) -> Option<Arc<Worker>> {
        let workers: Vec<Arc<Worker>> = self.buckets.lock().get(project).cloned().unwrap_or_default();
        for worker in workers {
            match worker.client_count().await {
                Ok(count) if maxclients == 0 || count < maxclients => return Some(worker),
                Ok(_) => {}
                Err(e) => warn!(worker = %worker.id, "client_count query failed: {e}"),
            }
        }
        None
    }

    pub fn insert(&self, project: PathBuf, worker: Arc<Worker>) {
        self.buckets.lock().entry(project).or_default().push(worker);
    }

    /// Kill and remove every worker bound to `project`. Returns the count
    /// killed, for `--restart`'s summary reply.
    pub fn kill_bucket(&self, project: &Path) -> usize {
        let workers = self.buckets.lock().remove(project).unwrap_or_default();
        let count = workers.len();
        for worker in &workers {
            worker.kill();
        }
        count
    }

    /// Kill every worker in every bucket, for conductor shutdown.
    pub fn kill_all(&self) -> usize {
        let mut buckets = self.buckets.lock();
        let mut count = 0;
        for (_, workers) in buckets.drain() {
            count += workers.len();
            for worker in workers {
                worker.kill();
            }
        }
        count
    }

    pub fn bucket_len(&self, project: &Path) -> usize {
        self.buckets.lock().get(project).map_or(0, Vec::len)
    }
}
