// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal raw-mode handling for the client, and the no-op stand-in the
//! worker side uses for its REPL adaptor contract (the "terminal" there is
//! a Unix socket, not a tty).

use std::io;

use nix::sys::termios::{cfmakeraw, tcgetattr, tcsetattr, SetArg, Termios};

/// Adapts a host REPL's terminal queries (is this a tty? what are its
/// capabilities?) to either a real terminal or a stub.
pub trait TerminalAdapter: Send + Sync {
    fn is_tty(&self) -> bool;
}

/// The client's real stdin/stdout terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealTerminalAdapter;

impl TerminalAdapter for RealTerminalAdapter {
    fn is_tty(&self) -> bool {
        use std::io::IsTerminal;
        io::stdin().is_terminal()
    }
}

/// Worker-side stub: the REPL believes it is talking to a terminal, but
/// every capability query and raw-mode toggle is a no-op, because the
/// actual stream is a Unix socket proxied by the client.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTerminalAdapter {
    pub tty: bool,
}

impl TerminalAdapter for NoopTerminalAdapter {
    fn is_tty(&self) -> bool {
        self.tty
    }
}

/// RAII guard that puts stdin into raw mode (disables `ICANON`/`ECHO`) and
/// restores the original terminal settings on drop, including on panic.
pub struct RawModeGuard {
    original: Termios,
}

impl RawModeGuard {
    /// No-op (returns `None`) if stdin is not a tty.
    pub fn enable() -> io::Result<Option<Self>> {
        use std::io::IsTerminal;
        if !io::stdin().is_terminal() {
            return Ok(None);
        }
        let stdin = io::stdin();
        let original = tcgetattr(&stdin).map_err(io::Error::from)?;
        let mut raw = original.clone();
        cfmakeraw(&mut raw);
        tcsetattr(&stdin, SetArg::TCSANOW, &raw).map_err(io::Error::from)?;
        Ok(Some(Self { original }))
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let stdin = io::stdin();
        let _ = tcsetattr(&stdin, SetArg::TCSANOW, &self.original);
    }
}
