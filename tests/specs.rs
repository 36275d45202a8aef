// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios run against a real `jdconductor` + `jd-worker`
//! pair, driven entirely through the reference evaluator (see
//! `crates/worker/src/reference_evaluator.rs`) rather than a real Julia
//! runtime.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use assert_cmd::Command as AssertCommand;
use tempfile::TempDir;

fn bin_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("target");
    path.push(if cfg!(debug_assertions) { "debug" } else { "release" });
    path.push(name);
    path
}

/// A conductor spawned against an isolated runtime directory, killed on
/// drop so a failing assertion never leaks a background process.
struct Daemon {
    child: Child,
    runtime: TempDir,
    socket_path: PathBuf,
}

impl Daemon {
    fn start(maxclients: &str) -> Self {
        let runtime = TempDir::new().expect("failed to create a temp runtime dir");
        let socket_path = runtime.path().join("conductor.sock");

        let child = Command::new(bin_path("jdconductor"))
            .env("XDG_RUNTIME_DIR", runtime.path())
            .env("JULIA_DAEMON_SERVER", &socket_path)
            .env("JULIA_DAEMON_WORKER_EXECUTABLE", bin_path("jd-worker"))
            .env("JULIA_DAEMON_WORKER_MAXCLIENTS", maxclients)
            .env("JULIA_DAEMON_WORKER_TTL", "0")
            .env("JULIA_DAEMON_LOG", "warn")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("failed to spawn jdconductor");

        wait_for_socket(&socket_path);
        Self { child, runtime, socket_path }
    }

    fn client(&self) -> AssertCommand {
        let mut cmd = AssertCommand::new(bin_path("juliaclient"));
        cmd.env("XDG_RUNTIME_DIR", self.runtime.path());
        cmd.env("JULIA_DAEMON_SERVER", &self.socket_path);
        cmd.env("JULIA_DAEMON_LOG", "warn");
        cmd
    }

    fn project_path(&self, name: &str) -> String {
        self.runtime.path().join(name).display().to_string()
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn wait_for_socket(path: &Path) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if path.exists() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("conductor socket never appeared at {}", path.display());
}

/// Scenario 1: `juliaclient -e 'print(1+1)'` ⇒ stdout exactly `2`, exit 0.
#[test]
fn eval_prints_arithmetic_result() {
    let daemon = Daemon::start("1");
    let output = daemon.client().args(["-e", "print(1+1)"]).output().expect("run client");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "2");
}

/// Scenario 2: `juliaclient --help` ⇒ the canned usage banner, exit 0, no
/// worker ever spawned for it (the conductor answers `--help` itself).
#[test]
fn help_is_served_without_a_worker() {
    let daemon = Daemon::start("1");
    let output = daemon.client().arg("--help").output().expect("run client");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("\n    juliaclient [switches]"), "unexpected help text: {stdout:?}");
}

/// Scenario 3: `juliaclient -e 'exit(42)'` ⇒ exit 42, stdout empty.
#[test]
fn exit_call_propagates_exit_code() {
    let daemon = Daemon::start("1");
    let output = daemon.client().args(["-e", "exit(42)"]).output().expect("run client");

    assert_eq!(output.status.code(), Some(42));
    assert!(output.stdout.is_empty());
}

/// Scenario 4: `juliaclient -e 'write(stdout, read(stdin, 3))'` with
/// stdin piping `ABC` ⇒ stdout exactly `ABC`, exit 0.
#[test]
fn stdin_bytes_echo_through_worker() {
    let daemon = Daemon::start("1");
    let output = daemon
        .client()
        .args(["-e", "write(stdout, read(stdin, 3))"])
        .write_stdin(b"ABC".to_vec())
        .output()
        .expect("run client");

    assert!(output.status.success());
    assert_eq!(output.stdout, b"ABC");
}

/// Scenario 5: two back-to-back invocations against the same project,
/// with `MAXCLIENTS=1`, reuse the one pooled worker instead of spawning a
/// second. Black-box proxy for that: spawning a worker subprocess costs
/// real wall-clock time the pooled path doesn't pay, so the warm
/// invocation must be markedly faster than the cold one.
#[test]
fn same_project_reuses_the_pooled_worker() {
    let daemon = Daemon::start("1");
    let project = daemon.project_path("p1");

    let cold_start = Instant::now();
    let cold = daemon.client().args(["--project", &project, "-e", "nothing"]).output().expect("run client");
    let cold_elapsed = cold_start.elapsed();
    assert!(cold.status.success());

    let warm_start = Instant::now();
    let warm = daemon.client().args(["--project", &project, "-e", "nothing"]).output().expect("run client");
    let warm_elapsed = warm_start.elapsed();
    assert!(warm.status.success());

    assert!(
        warm_elapsed < cold_elapsed,
        "expected the pooled invocation ({warm_elapsed:?}) to beat the cold-start one ({cold_elapsed:?})"
    );
}

/// Scenario 6: `juliaclient --restart --project=/p1` after a warm
/// invocation for that project reports killing exactly the one pooled
/// worker.
#[test]
fn restart_kills_the_pooled_worker_for_a_project() {
    let daemon = Daemon::start("1");
    let project = daemon.project_path("p1");

    let warm = daemon.client().args(["--project", &project, "-e", "nothing"]).output().expect("run client");
    assert!(warm.status.success());

    let restart =
        daemon.client().arg("--restart").arg(format!("--project={project}")).output().expect("run client");

    assert!(restart.status.success());
    assert_eq!(String::from_utf8_lossy(&restart.stdout), "Reset: killed 1 worker(s) for project\n");
}
