// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test-only builders shared across crates (enabled via the `test-support`
//! feature so downstream crates can depend on this in their dev-deps
//! without pulling it into release builds).

use crate::client_info::ClientInfo;

/// A `ClientInfo` builder with sensible defaults, for tests that only care
/// about a few fields.
#[derive(Debug, Clone)]
pub struct ClientInfoBuilder {
    tty: bool,
    pid: u32,
    cwd: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
}

impl Default for ClientInfoBuilder {
    fn default() -> Self {
        Self { tty: false, pid: 1, cwd: "/tmp".to_string(), args: Vec::new(), env: Vec::new() }
    }
}

impl ClientInfoBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tty(mut self, tty: bool) -> Self {
        self.tty = tty;
        self
    }

    pub fn pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    pub fn cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn env(mut self, env: Vec<(String, String)>) -> Self {
        self.env = env;
        self
    }

    pub fn build(self) -> ClientInfo {
        ClientInfo::new(self.tty, self.pid, self.cwd, self.args).with_env(self.env)
    }
}
