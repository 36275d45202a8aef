// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-client (or top-level) execution context the `Evaluator` seam
//! runs against: bound `cwd`/`args`, an isolated `SystemExit` channel (a
//! `SystemExit` raised here never reaches a sibling session), and the
//! redirected stdio streams a real embedded REPL would write to and read
//! from.

use std::io::{Read, Write};
use std::path::PathBuf;

/// Colour/banner/history decisions threaded in explicitly rather than
/// queried from a real terminal, since the worker's "terminal" is a
/// socket (see the REPL adaptor contract).
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub color: bool,
    pub banner: bool,
    pub history_file: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self { color: false, banner: true, history_file: true }
    }
}

pub struct Namespace {
    pub cwd: String,
    pub args: Vec<String>,
    pub project: Option<PathBuf>,
    pub display: DisplayOptions,
    stdout: Option<Box<dyn Write + Send>>,
    stdin: Option<Box<dyn Read + Send>>,
}

impl Namespace {
    /// The top-level namespace a reserve/unbound worker evaluates
    /// `eval`/`set_project` requests against. No stdio attached.
    pub fn top_level() -> Self {
        Self {
            cwd: "/".to_string(),
            args: Vec::new(),
            project: None,
            display: DisplayOptions::default(),
            stdout: None,
            stdin: None,
        }
    }

    pub fn for_session(cwd: String, args: Vec<String>) -> Self {
        Self {
            cwd,
            args,
            project: None,
            display: DisplayOptions::default(),
            stdout: None,
            stdin: None,
        }
    }

    pub fn attach_stdio(&mut self, stdout: Box<dyn Write + Send>, stdin: Box<dyn Read + Send>) {
        self.stdout = Some(stdout);
        self.stdin = Some(stdin);
    }

    pub fn write_stdout(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        match self.stdout.as_mut() {
            Some(w) => w.write_all(bytes),
            None => Ok(()),
        }
    }

    /// Read exactly `n` bytes unless the stream hits EOF first, in which
    /// case fewer bytes (including zero) are returned rather than an error.
    pub fn read_stdin(&mut self, n: usize) -> std::io::Result<Vec<u8>> {
        let Some(r) = self.stdin.as_mut() else {
            return Ok(Vec::new());
        };
        let mut buf = vec![0u8; n];
        let mut filled = 0;
        while filled < n {
            let read = r.read(&mut buf[filled..])?;
            if read == 0 {
                break;
            }
            filled += read;
        }
        buf.truncate(filled);
        Ok(buf)
    }
}
