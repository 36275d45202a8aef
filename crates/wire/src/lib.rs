// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire formats used between the client, conductor, and worker.
//!
//! Two distinct formats coexist here:
//!
//! - The client/conductor handshake (`frame`, `envcache`) is a bit-exact
//!   binary layout, because it sits on the hot path of every invocation.
//! - The conductor/worker control channel (`control`) and the signals
//!   stream (`signal`) are internal and can afford a length-prefixed JSON
//!   envelope, the way this codebase's other internal IPC is framed.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod control;
pub mod envcache;
pub mod error;
pub mod frame;
pub mod signal;

pub use control::{read_control, write_control, ControlRequest, ControlResponse};
pub use envcache::EnvCache;
pub use error::ProtocolError;
pub use frame::{
    read_env_pairs, read_handshake, read_handshake_ack, read_socket_paths, write_cache_miss_sentinel,
    write_env_pairs, write_handshake, write_socket_paths, HandshakeAck, HandshakeFields,
    SocketPaths, HANDSHAKE_MAGIC,
};
pub use signal::{SignalFrame, SignalParser};

#[cfg(test)]
mod property_tests;
