// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Out-of-band signal framing on the worker->client signals socket:
//! `SOH name STX data EOT`. The parser is a small state machine so it
//! tolerates the stream being split into arbitrary chunks by the kernel.

use crate::error::ProtocolError;

const SOH: u8 = 0x01;
const STX: u8 = 0x02;
const EOT: u8 = 0x04;

/// One parsed out-of-band signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalFrame {
    pub name: String,
    pub data: String,
}

impl SignalFrame {
    pub fn exit(code: i32) -> Self {
        Self { name: "exit".to_string(), data: code.to_string() }
    }

    /// Parse `self.data` as the decimal exit code, for `name == "exit"`.
    pub fn exit_code(&self) -> Result<i32, ProtocolError> {
        self.data
            .parse()
            .map_err(|_| ProtocolError::MalformedSignal("exit frame data is not a decimal integer"))
    }

    /// Encode as `SOH name STX data EOT`.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.name.len() + self.data.len() + 3);
        out.push(SOH);
        out.extend_from_slice(self.name.as_bytes());
        out.push(STX);
        out.extend_from_slice(self.data.as_bytes());
        out.push(EOT);
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    InName,
    InData,
}

/// Bound on one frame's total encoded size, matching the spec's 1 KiB
/// bounded buffer requirement.
const MAX_FRAME_BYTES: usize = 1024;

/// Incremental parser: feed it bytes as they arrive off the socket, get
/// back zero or more complete frames. State survives across `feed` calls
/// so a frame split across reads is still recognised.
#[derive(Debug)]
pub struct SignalParser {
    state: State,
    name: Vec<u8>,
    data: Vec<u8>,
    frame_len: usize,
}

impl Default for SignalParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalParser {
    pub fn new() -> Self {
        Self { state: State::Idle, name: Vec::new(), data: Vec::new(), frame_len: 0 }
    }

    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<SignalFrame>, ProtocolError> {
        let mut frames = Vec::new();
        for &b in bytes {
            match self.state {
                State::Idle => {
                    if b != SOH {
                        return Err(ProtocolError::MalformedSignal("frame does not start with SOH"));
                    }
                    self.name.clear();
                    self.frame_len = 1;
                    self.state = State::InName;
                }
                State::InName => {
                    self.frame_len += 1;
                    self.check_bound()?;
                    match b {
                        STX => {
                            self.data.clear();
                            self.state = State::InData;
                        }
                        SOH | EOT => {
                            return Err(ProtocolError::MalformedSignal(
                                "unexpected control byte in signal name",
                            ))
                        }
                        _ => self.name.push(b),
                    }
                }
                State::InData => {
                    self.frame_len += 1;
                    self.check_bound()?;
                    match b {
                        EOT => {
                            frames.push(SignalFrame {
                                name: String::from_utf8_lossy(&self.name).into_owned(),
                                data: String::from_utf8_lossy(&self.data).into_owned(),
                            });
                            self.state = State::Idle;
                        }
                        STX | SOH => {
                            return Err(ProtocolError::MalformedSignal(
                                "unexpected control byte in signal data",
                            ))
                        }
                        _ => self.data.push(b),
                    }
                }
            }
        }
        Ok(frames)
    }

    fn check_bound(&self) -> Result<(), ProtocolError> {
        if self.frame_len > MAX_FRAME_BYTES {
            Err(ProtocolError::MalformedSignal("signal frame exceeds bounded buffer"))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "signal_tests.rs"]
mod tests;
