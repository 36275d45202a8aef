// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error type for project/path resolution in jd-core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("could not determine home directory")]
    NoHomeDir,

    #[error("invalid UTF-8 in path: {0}")]
    InvalidUtf8(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
