// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment/argv access for the worker binary.

use std::path::PathBuf;
use std::time::Duration;

/// Extract `--control-socket=PATH` from the worker's own argv (appended
/// by the conductor when it spawns the subprocess).
pub fn control_socket_path(args: &[String]) -> Option<PathBuf> {
    args.iter().find_map(|a| a.strip_prefix("--control-socket=").map(PathBuf::from))
}

/// Set by the conductor via `JULIA_DAEMON_WORKER_ID` so the worker's logs
/// can be correlated with the conductor's.
pub fn worker_id() -> Option<String> {
    std::env::var("JULIA_DAEMON_WORKER_ID").ok()
}

/// Idle seconds before the worker self-exits; `0` disables the TTL.
pub fn worker_ttl() -> Duration {
    let secs = std::env::var("JULIA_DAEMON_WORKER_TTL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(7200u64);
    Duration::from_secs(secs)
}

pub fn log_filter() -> Option<String> {
    std::env::var("JULIA_DAEMON_LOG").ok()
}

/// Per-process runtime directory for this worker's session sockets.
pub fn runtime_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(dir).join("julia-daemon");
    }
    let uid = nix::unistd::getuid();
    PathBuf::from(format!("/run/user/{uid}")).join("julia-daemon")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_socket_path_finds_flag() {
        let args = vec!["--startup-file=no".to_string(), "--control-socket=/tmp/x.sock".to_string()];
        assert_eq!(control_socket_path(&args), Some(PathBuf::from("/tmp/x.sock")));
    }

    #[test]
    fn control_socket_path_absent_is_none() {
        assert_eq!(control_socket_path(&["--startup-file=no".to_string()]), None);
    }
}
