// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the client.

use std::path::PathBuf;

/// Main socket endpoint, matching the conductor's own resolution so the
/// client and conductor agree on where it lives without coordination.
pub fn server_path() -> PathBuf {
    if let Ok(path) = std::env::var("JULIA_DAEMON_SERVER") {
        return PathBuf::from(path);
    }
    runtime_dir().join("conductor.sock")
}

pub fn runtime_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(dir).join("julia-daemon");
    }
    let uid = nix::unistd::getuid();
    PathBuf::from(format!("/run/user/{uid}")).join("julia-daemon")
}

pub fn log_filter() -> Option<String> {
    std::env::var("JULIA_DAEMON_LOG").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn server_path_honors_explicit_override() {
        std::env::set_var("JULIA_DAEMON_SERVER", "/tmp/explicit.sock");
        assert_eq!(server_path(), PathBuf::from("/tmp/explicit.sock"));
        std::env::remove_var("JULIA_DAEMON_SERVER");
    }
}
