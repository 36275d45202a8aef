// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("bad magic bytes in handshake frame")]
    BadMagic,

    #[error("invalid UTF-8 in wire field")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("malformed signal frame: {0}")]
    MalformedSignal(&'static str),

    #[error("unrecognised signal: {0}")]
    UnknownSignal(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("control message decode error: {0}")]
    Control(#[from] serde_json::Error),
}
