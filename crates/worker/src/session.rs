// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-client session: isolated namespace, scoped environment overrides,
//! switch execution in source order, and exit-signal delivery. This is
//! the worker shim's per-session flow (§4.2 steps 1-8).

use std::os::unix::net::UnixStream as StdUnixStream;
use std::sync::Arc;

use jd_core::{ClientInfo, Switch};
use jd_wire::SignalFrame;
use tokio::io::AsyncWriteExt;
use tokio::net::UnixStream;
use tracing::{error, warn};

use crate::error::EvalError;
use crate::namespace::{DisplayOptions, Namespace};
use crate::worker_state::WorkerState;

/// Drive one client's session to completion: apply env overrides, run
/// switches, fall back to the REPL if nothing else ran, then signal the
/// resulting exit code back over `signals` and tear down.
pub async fn run_session(info: ClientInfo, state: Arc<WorkerState>, stdio: UnixStream, mut signals: UnixStream) {
    state.session_started();

    let exit_code = match run(info, &state, stdio).await {
        Ok(code) => code,
        Err(e) => {
            error!("session setup failed: {e}");
            1
        }
    };

    let frame = SignalFrame::exit(exit_code.clamp(0, 255));
    if let Err(e) = signals.write_all(&frame.encode()).await {
        warn!("failed to write exit signal: {e}");
    }

    state.session_ended();
    if state.soft_exit_requested() && state.client_count() == 0 {
        std::process::exit(0);
    }
}

/// Run a client's switches with no stdio attached at all: nobody ever
/// connected to the session sockets (the reserve worker's synthetic
/// warm-up client, or a real client that connected to the conductor and
/// then vanished). Still exercises env overrides and the evaluator
/// dispatch path; any error is logged rather than displayed, since there
/// is no stdio to display it on.
pub async fn run_detached(info: ClientInfo, state: &Arc<WorkerState>) {
    let evaluator = state.evaluator.clone();
    let env_guard = state.env_lock.lock().await;
    let applied = apply_env_overrides(&info);

    let result = tokio::task::spawn_blocking(move || {
        let mut ns = Namespace::for_session(info.cwd.clone(), info.switches.program_args.clone());
        ns.display = derive_display_options(&info);
        execute_switches(&info, evaluator.as_ref(), &mut ns)
    })
    .await;

    restore_env_overrides(applied);
    drop(env_guard);

    match result {
        Ok(Ok(())) => {}
        Ok(Err(EvalError::SystemExit(_))) => {}
        Ok(Err(e)) => warn!("detached session failed: {e}"),
        Err(e) => warn!("detached session task panicked: {e}"),
    }
}

async fn run(info: ClientInfo, state: &Arc<WorkerState>, stdio: UnixStream) -> Result<i32, EvalError> {
    let std_stream = stdio.into_std().map_err(|e| EvalError::Runtime(format!("stdio handoff failed: {e}")))?;
    std_stream.set_nonblocking(false).map_err(|e| EvalError::Runtime(format!("stdio mode failed: {e}")))?;
    let reader = std_stream.try_clone().map_err(|e| EvalError::Runtime(format!("stdio clone failed: {e}")))?;

    let evaluator = state.evaluator.clone();
    let runtime_dir = state.runtime_dir.clone();
    let env_guard = state.env_lock.lock().await;
    let applied = apply_env_overrides(&info);

    let result = tokio::task::spawn_blocking(move || {
        run_blocking(info, evaluator.as_ref(), std_stream, reader, runtime_dir)
    })
    .await;

    restore_env_overrides(applied);
    drop(env_guard);

    match result {
        Ok(inner) => inner,
        Err(e) => Err(EvalError::Runtime(format!("session task panicked: {e}"))),
    }
}

fn run_blocking(
    info: ClientInfo,
    evaluator: &dyn crate::evaluator::Evaluator,
    writer: StdUnixStream,
    reader: StdUnixStream,
    _runtime_dir: std::path::PathBuf,
) -> Result<i32, EvalError> {
    let mut ns = Namespace::for_session(info.cwd.clone(), info.switches.program_args.clone());
    ns.display = derive_display_options(&info);
    ns.attach_stdio(Box::new(writer), Box::new(reader));

    match execute_switches(&info, evaluator, &mut ns) {
        Ok(()) => Ok(0),
        Err(EvalError::SystemExit(code)) => Ok(code),
        Err(e) => {
            let _ = ns.write_stdout(format!("error: {e}\n").as_bytes());
            Ok(1)
        }
    }
}

/// Run switches in source order, then the program file, then the REPL if
/// nothing else was requested. A `SystemExit` propagates to the caller
/// unscrubbed; any other error is the caller's responsibility to display.
fn execute_switches(
    info: &ClientInfo,
    evaluator: &dyn crate::evaluator::Evaluator,
    ns: &mut Namespace,
) -> Result<(), EvalError> {
    let mut ran_something = false;
    for switch in info.switches.iter() {
        match switch {
            Switch::Eval(expr) => {
                ran_something = true;
                evaluator.eval(expr, ns)?;
            }
            Switch::Print(expr) => {
                ran_something = true;
                let outcome = evaluator.eval(expr, ns)?;
                if let Some(text) = outcome.display() {
                    let _ = ns.write_stdout(text.as_bytes());
                }
            }
            Switch::Load(path) => {
                ran_something = true;
                evaluator.include(path, ns)?;
            }
            _ => {}
        }
    }

    if let Some(program_file) = info.switches.program_file.clone() {
        ran_something = true;
        if program_file == "-" {
            let source = read_all_stdin(ns);
            evaluator.eval(&source, ns)?;
        } else {
            evaluator.include(&program_file, ns)?;
        }
    }

    let wants_repl = info.switches.contains("interactive") || !ran_something;
    if wants_repl {
        run_repl(evaluator, ns)?;
    }

    Ok(())
}

fn read_all_stdin(ns: &mut Namespace) -> String {
    let mut out = Vec::new();
    loop {
        match ns.read_stdin(1) {
            Ok(b) if b.is_empty() => break,
            Ok(b) => out.extend_from_slice(&b),
            Err(_) => break,
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// A minimal REPL loop: each stdin line is evaluated and, if it produced
/// a value, printed. Exits on EOF or `exit(n)`.
fn run_repl(evaluator: &dyn crate::evaluator::Evaluator, ns: &mut Namespace) -> Result<(), EvalError> {
    if ns.display.banner {
        let _ = ns.write_stdout(b"julia-daemon worker (reference evaluator)\n");
    }
    loop {
        let mut line = Vec::new();
        loop {
            match ns.read_stdin(1) {
                Ok(b) if b.is_empty() => return Ok(()),
                Ok(b) if b[0] == b'\n' => break,
                Ok(b) => line.extend_from_slice(&b),
                Err(_) => return Ok(()),
            }
        }
        if line.is_empty() {
            continue;
        }
        let text = String::from_utf8_lossy(&line).into_owned();
        match evaluator.eval(&text, ns) {
            Ok(outcome) => {
                if let Some(text) = outcome.display() {
                    let _ = ns.write_stdout(text.as_bytes());
                }
            }
            Err(EvalError::SystemExit(code)) => return Err(EvalError::SystemExit(code)),
            Err(e) => {
                let _ = ns.write_stdout(format!("error: {e}\n").as_bytes());
            }
        }
    }
}

fn derive_display_options(info: &ClientInfo) -> DisplayOptions {
    let color = match info.switches.last_value("color") {
        Some("yes") => true,
        Some("no") => false,
        _ => info.env_var("TERM").map(|t| t.starts_with("xterm")).unwrap_or(false),
    };
    let banner = match info.switches.last_value("banner") {
        Some("no") => false,
        Some("yes") => true,
        _ => !info.switches.contains("quiet"),
    };
    let history_file = info.switches.last_value("history-file") != Some("no");
    DisplayOptions { color, banner, history_file }
}

/// Apply `info.env` as process-wide overrides, snapshotting each key's
/// prior value so it can be restored when the session ends.
fn apply_env_overrides(info: &ClientInfo) -> Vec<(String, Option<String>)> {
    let mut previous = Vec::with_capacity(info.env.len());
    for (key, value) in &info.env {
        previous.push((key.clone(), std::env::var(key).ok()));
        std::env::set_var(key, value);
    }
    previous
}

fn restore_env_overrides(previous: Vec<(String, Option<String>)>) {
    for (key, value) in previous {
        match value {
            Some(v) => std::env::set_var(&key, v),
            None => std::env::remove_var(&key),
        }
    }
}
