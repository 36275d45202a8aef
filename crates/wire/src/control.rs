// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Conductor<->worker control channel: a length-prefixed JSON envelope,
//! the way the rest of this codebase's internal IPC is framed. This is
//! not the bit-exact client-facing wire (see `frame`) — it's a private
//! channel between trusted local processes, so JSON is the pragmatic
//! choice here.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use jd_core::ClientInfo;

use crate::error::ProtocolError;

/// Sent from the conductor to a worker over its control connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlRequest {
    /// Start a new per-client session.
    Client(ClientInfo),
    /// Evaluate an opaque expression in the worker's top scope (used to
    /// bind a reserve worker to a project, or to query `client_count`).
    Eval(String),
    /// Exit now if idle, else exit when the last session ends.
    SoftExit,
}

/// Sent from a worker back to the conductor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlResponse {
    /// One of the two per-session socket paths (`kind` is `"stdio"` or
    /// `"signals"`).
    Socket { kind: String, path: String },
    EvalResult(String),
    Ack,
}

pub async fn write_control<W, T>(writer: &mut W, message: &T) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let payload = serde_json::to_vec(message)?;
    writer.write_u32(payload.len() as u32).await?;
    writer.write_all(&payload).await?;
    Ok(())
}

pub async fn read_control<R, T>(reader: &mut R) -> Result<T, ProtocolError>
where
    R: AsyncRead + Unpin,
    T: for<'de> Deserialize<'de>,
{
    let len = reader.read_u32().await?;
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf).await?;
    Ok(serde_json::from_slice(&buf)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_eval_request() {
        let req = ControlRequest::Eval("1+1".to_string());
        let mut buf = Vec::new();
        write_control(&mut buf, &req).await.expect("write");
        let mut cursor = &buf[..];
        let decoded: ControlRequest = read_control(&mut cursor).await.expect("read");
        assert!(matches!(decoded, ControlRequest::Eval(e) if e == "1+1"));
    }

    #[tokio::test]
    async fn round_trips_socket_response() {
        let resp = ControlResponse::Socket { kind: "stdio".to_string(), path: "/tmp/s".to_string() };
        let mut buf = Vec::new();
        write_control(&mut buf, &resp).await.expect("write");
        let mut cursor = &buf[..];
        let decoded: ControlResponse = read_control(&mut cursor).await.expect("read");
        assert!(matches!(decoded, ControlResponse::Socket { kind, path } if kind == "stdio" && path == "/tmp/s"));
    }
}
