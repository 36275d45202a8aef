// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the conductor, per the
//! table of recognised variables.

use std::path::PathBuf;
use std::time::Duration;

/// Main socket endpoint: `$JULIA_DAEMON_SERVER`, else
/// `${XDG_RUNTIME_DIR}/julia-daemon/conductor.sock`, falling back to
/// `/run/user/<uid>` for `XDG_RUNTIME_DIR`.
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

/// Max concurrent sessions per worker; `0` disables the cap.
pub fn worker_maxclients() -> usize {
    std::env::var("JULIA_DAEMON_WORKER_MAXCLIENTS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1)
}

/// Whitespace-split args appended to the worker command line.
pub fn worker_args() -> Vec<String> {
    std::env::var("JULIA_DAEMON_WORKER_ARGS")
        .unwrap_or_else(|_| "--startup-file=no".to_string())
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Worker binary; resolved on `PATH` by the process adapter if relative.
pub fn worker_executable() -> String {
    std::env::var("JULIA_DAEMON_WORKER_EXECUTABLE").unwrap_or_else(|_| "jd-worker".to_string())
}

/// Idle seconds before a worker self-exits; `0` disables the TTL.
pub fn worker_ttl() -> Duration {
    let secs = std::env::var("JULIA_DAEMON_WORKER_TTL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(7200u64);
    Duration::from_secs(secs)
}

/// `tracing-subscriber` `EnvFilter` directive for the conductor and worker.
pub fn log_filter() -> Option<String> {
    std::env::var("JULIA_DAEMON_LOG").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn worker_maxclients_defaults_to_one() {
        std::env::remove_var("JULIA_DAEMON_WORKER_MAXCLIENTS");
        assert_eq!(worker_maxclients(), 1);
    }

    #[test]
    #[serial]
    fn worker_args_default_includes_no_startup_file() {
        std::env::remove_var("JULIA_DAEMON_WORKER_ARGS");
        assert_eq!(worker_args(), vec!["--startup-file=no".to_string()]);
    }

    #[test]
    #[serial]
    fn worker_ttl_defaults_to_two_hours() {
        std::env::remove_var("JULIA_DAEMON_WORKER_TTL");
        assert_eq!(worker_ttl(), Duration::from_secs(7200));
    }

    #[test]
    #[serial]
    fn worker_ttl_zero_disables_reaping() {
        std::env::set_var("JULIA_DAEMON_WORKER_TTL", "0");
        assert_eq!(worker_ttl(), Duration::from_secs(0));
        std::env::remove_var("JULIA_DAEMON_WORKER_TTL");
    }
}
