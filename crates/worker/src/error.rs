// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Raised by the `Evaluator` seam. `SystemExit` unwinds only the session
/// that raised it, never the worker process itself.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("exit({0})")]
    SystemExit(i32),

    #[error("{0}")]
    Runtime(String),
}

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("protocol error: {0}")]
    Protocol(#[from] jd_wire::ProtocolError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("control connection closed")]
    Disconnected,
}
