// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared, process-wide state for one worker: active-session bookkeeping,
//! the soft-exit flag, and the top-level `Namespace` `eval` targets.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

use crate::evaluator::Evaluator;
use crate::namespace::Namespace;

pub struct WorkerState {
    pub evaluator: std::sync::Arc<dyn Evaluator>,
    pub runtime_dir: PathBuf,
    top_level: Mutex<Namespace>,
    client_count: AtomicUsize,
    soft_exit: AtomicBool,
    last_client_time: Mutex<Instant>,
    /// Bumped on every session start/stop; a scheduled TTL timer compares
    /// its captured value against the current one to detect whether any
    /// session has arrived since it was scheduled.
    generation: AtomicU64,
    /// Serialises process-wide environment-variable overrides across
    /// concurrent sessions, since `std::env::set_var` has no per-thread
    /// scoping.
    pub env_lock: tokio::sync::Mutex<()>,
}

impl WorkerState {
    pub fn new(evaluator: std::sync::Arc<dyn Evaluator>, runtime_dir: PathBuf) -> Self {
        Self {
            evaluator,
            runtime_dir,
            top_level: Mutex::new(Namespace::top_level()),
            client_count: AtomicUsize::new(0),
            soft_exit: AtomicBool::new(false),
            last_client_time: Mutex::new(Instant::now()),
            generation: AtomicU64::new(0),
            env_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn client_count(&self) -> usize {
        self.client_count.load(Ordering::SeqCst)
    }

    pub fn soft_exit_requested(&self) -> bool {
        self.soft_exit.load(Ordering::SeqCst)
    }

    pub fn request_soft_exit(&self) {
        self.soft_exit.store(true, Ordering::SeqCst);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn session_started(&self) {
        self.client_count.fetch_add(1, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn session_ended(&self) {
        self.client_count.fetch_sub(1, Ordering::SeqCst);
        *self.last_client_time.lock() = Instant::now();
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn idle_for(&self) -> std::time::Duration {
        self.last_client_time.lock().elapsed()
    }

    pub fn eval_top_level(&self, expr: &str) -> Result<crate::evaluator::EvalOutcome, crate::error::EvalError> {
        let mut ns = self.top_level.lock();
        self.evaluator.eval(expr, &mut ns)
    }
}
