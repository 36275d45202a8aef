// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ClientInfo`: everything the conductor and worker learn about one
//! invocation during the handshake.

use serde::{Deserialize, Serialize};

use crate::switches::Switches;

/// Immutable once parsed: constructed during the handshake and handed to
/// the pool, the worker, and the session it drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub tty: bool,
    pub pid: u32,
    pub cwd: String,
    pub env_fingerprint: u64,
    /// Empty until a cache miss forces the client to send it, or a cache
    /// hit resolves it from the conductor's env cache.
    pub env: Vec<(String, String)>,
    pub args: Vec<String>,
    pub switches: Switches,
}

impl ClientInfo {
    pub fn new(tty: bool, pid: u32, cwd: String, args: Vec<String>) -> Self {
        let switches = Switches::parse(&args);
        Self { tty, pid, cwd, env_fingerprint: 0, env: Vec::new(), args, switches }
    }

    pub fn with_fingerprint(mut self, fingerprint: u64) -> Self {
        self.env_fingerprint = fingerprint;
        self
    }

    pub fn with_env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }

    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn program_file(&self) -> Option<&str> {
        self.switches.program_file.as_deref()
    }
}
