// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("worker control channel closed")]
    Disconnected,

    #[error("protocol error on worker control channel: {0}")]
    Protocol(#[from] jd_wire::ProtocolError),

    #[error("unexpected control response: {0:?}")]
    UnexpectedResponse(jd_wire::ControlResponse),

    #[error("malformed client_count response: {0:?}")]
    BadClientCount(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("failed to spawn worker: {0}")]
    Spawn(#[from] jd_adapters::AdapterError),

    #[error(transparent)]
    Worker(#[from] WorkerError),
}
