// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process and terminal seams: the conductor spawns real worker
//! subprocesses through these, and the client puts a real terminal into
//! raw mode through these, so both sides can be exercised against fakes
//! in tests.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod process;
pub mod terminal;

#[cfg(any(test, feature = "test-support"))]
pub mod process_fake;

pub use process::{AdapterError, ProcessAdapter, RealProcessAdapter, WorkerProcess};
pub use terminal::{RawModeGuard, RealTerminalAdapter, TerminalAdapter};

#[cfg(any(test, feature = "test-support"))]
pub use process_fake::{FakeProcessAdapter, FakeWorkerProcess};
