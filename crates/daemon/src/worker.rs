// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A single worker subprocess: its control connection, project binding,
//! and session bookkeeping. Every interaction with a worker's control
//! connection is serialised under `control`.

use std::path::PathBuf;
use std::time::Instant;

use jd_adapters::WorkerProcess;
use jd_core::{ClientInfo, WorkerId};
use jd_wire::{read_control, write_control, ControlRequest, ControlResponse, SocketPaths};
use parking_lot::Mutex;
use tokio::net::UnixStream;
use tokio::sync::Mutex as AsyncMutex;

use crate::error::WorkerError;

pub struct Worker {
    pub id: WorkerId,
    pub ctime: Instant,
    process: Mutex<Box<dyn WorkerProcess>>,
    control: AsyncMutex<UnixStream>,
    project: Mutex<Option<PathBuf>>,
}

impl Worker {
    pub fn new(
        id: WorkerId,
        process: Box<dyn WorkerProcess>,
        control: UnixStream,
        project: Option<PathBuf>,
        now: Instant,
    ) -> Self {
        Self {
            id,
            ctime: now,
            process: Mutex::new(process),
            control: AsyncMutex::new(control),
            project: Mutex::new(project),
        }
    }

    pub fn project(&self) -> Option<PathBuf> {
        self.project.lock().clone()
    }

    pub fn bind_project(&self, project: PathBuf) {
        *self.project.lock() = Some(project);
    }

    /// The worker's live concurrent-session count, queried over the
    /// control connection rather than tracked locally: the worker is the
    /// only process that actually observes session start/end.
    pub async fn client_count(&self) -> Result<usize, WorkerError> {
        let reply = self.eval("client_count").await?;
        reply.trim().parse().map_err(|_| WorkerError::BadClientCount(reply))
    }

    pub fn is_dead(&self) -> bool {
        self.process.lock().has_exited()
    }

    pub fn kill(&self) {
        self.process.lock().kill();
    }

    /// Start a new session for `info` on this worker, returning the two
    /// socket paths the client should connect to.
    pub async fn start_client(&self, info: ClientInfo) -> Result<(String, String), WorkerError> {
        let mut control = self.control.lock().await;
        write_control(&mut *control, &ControlRequest::Client(info)).await?;

        let stdio = read_socket(&mut control).await?;
        let signals = read_socket(&mut control).await?;
        Ok((stdio, signals))
    }

    /// Evaluate an opaque expression in the worker's top scope (used to
    /// bind a reserve worker to a project, and to query state).
    pub async fn eval(&self, expr: &str) -> Result<String, WorkerError> {
        let mut control = self.control.lock().await;
        write_control(&mut *control, &ControlRequest::Eval(expr.to_string())).await?;
        match read_control(&mut *control).await? {
            ControlResponse::EvalResult(result) => Ok(result),
            other => Err(WorkerError::UnexpectedResponse(other)),
        }
    }

    /// Request the worker exit once idle (or immediately, if already idle).
    pub async fn request_soft_exit(&self) -> Result<(), WorkerError> {
        let mut control = self.control.lock().await;
        write_control(&mut *control, &ControlRequest::SoftExit).await?;
        Ok(())
    }
}

async fn read_socket(control: &mut UnixStream) -> Result<String, WorkerError> {
    match read_control(control).await? {
        ControlResponse::Socket { path, .. } => Ok(path),
        other => Err(WorkerError::UnexpectedResponse(other)),
    }
}

/// Convenience constructor used by tests that only care about the
/// socket-paths pair, without a full `Worker`.
pub fn socket_paths_from(stdio_path: String, signals_path: String) -> SocketPaths {
    SocketPaths { stdio_path, signals_path }
}
