// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake process adapter for testing pool/reserve logic without forking.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::process::{AdapterError, ProcessAdapter, WorkerProcess};

#[derive(Debug, Clone)]
pub struct FakeWorkerProcess {
    pid: u32,
    exited: Arc<AtomicBool>,
}

impl FakeWorkerProcess {
    /// Mark this fake process as exited, as observed by the next
    /// `has_exited`/`wait_for_exit` call.
    pub fn mark_exited(&self) {
        self.exited.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl WorkerProcess for FakeWorkerProcess {
    fn pid(&self) -> Option<u32> {
        Some(self.pid)
    }

    fn has_exited(&mut self) -> bool {
        self.exited.load(Ordering::SeqCst)
    }

    async fn wait_for_exit(&mut self) -> std::io::Result<i32> {
        while !self.exited.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        Ok(0)
    }

    fn kill(&mut self) {
        self.mark_exited();
    }
}

/// Records every spawn call and hands back controllable fake processes;
/// never touches the OS.
#[derive(Debug, Default)]
pub struct FakeProcessAdapter {
    next_pid: AtomicU32,
    pub spawned: std::sync::Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeProcessAdapter {
    pub fn new() -> Self {
        Self { next_pid: AtomicU32::new(1), spawned: std::sync::Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl ProcessAdapter for FakeProcessAdapter {
    async fn spawn(
        &self,
        executable: &str,
        args: &[String],
        _env: &[(String, String)],
        _cwd: Option<&Path>,
    ) -> Result<Box<dyn WorkerProcess>, AdapterError> {
        self.spawned.lock().expect("lock").push((executable.to_string(), args.to_vec()));
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeWorkerProcess { pid, exited: Arc::new(AtomicBool::new(false)) }))
    }
}
