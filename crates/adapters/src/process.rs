// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker subprocess spawning, behind a trait so the conductor's pool
//! logic can be tested without forking real processes.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::{Child, Command};

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to spawn worker process: {0}")]
    Spawn(#[source] std::io::Error),
}

/// A running worker subprocess.
#[async_trait]
pub trait WorkerProcess: Send + Sync {
    fn pid(&self) -> Option<u32>;

    /// Non-blocking liveness check: `true` once the process has exited.
    fn has_exited(&mut self) -> bool;

    /// Wait for the process to exit and return its status code.
    async fn wait_for_exit(&mut self) -> std::io::Result<i32>;

    fn kill(&mut self);
}

#[async_trait]
impl WorkerProcess for Child {
    fn pid(&self) -> Option<u32> {
        self.id()
    }

    fn has_exited(&mut self) -> bool {
        matches!(self.try_wait(), Ok(Some(_)))
    }

    async fn wait_for_exit(&mut self) -> std::io::Result<i32> {
        let status = self.wait().await?;
        Ok(status.code().unwrap_or(-1))
    }

    fn kill(&mut self) {
        let _ = self.start_kill();
    }
}

/// Spawns worker subprocesses, behind a trait for testability.
#[async_trait]
pub trait ProcessAdapter: Send + Sync {
    async fn spawn(
        &self,
        executable: &str,
        args: &[String],
        env: &[(String, String)],
        cwd: Option<&Path>,
    ) -> Result<Box<dyn WorkerProcess>, AdapterError>;
}

/// Spawns real OS processes via `tokio::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealProcessAdapter;

#[async_trait]
impl ProcessAdapter for RealProcessAdapter {
    async fn spawn(
        &self,
        executable: &str,
        args: &[String],
        env: &[(String, String)],
        cwd: Option<&Path>,
    ) -> Result<Box<dyn WorkerProcess>, AdapterError> {
        let mut command = Command::new(executable);
        command.args(args);
        command.envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }
        command.kill_on_drop(true);
        let child = command.spawn().map_err(AdapterError::Spawn)?;
        Ok(Box::new(child))
    }
}
