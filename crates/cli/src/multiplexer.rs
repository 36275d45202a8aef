// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stage 4: the three-stream pump. Drives `stdio_sock` <-> local
//! stdin/stdout and parses `signals_sock` for the exit frame, with a
//! `SIGINT` handler relaying `\x03` into the stdio socket.

use jd_wire::SignalParser;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tracing::warn;

use crate::exit_error::ExitError;

const BUF_SIZE: usize = 8192;

/// Pump `stdio` and `signals` until an `exit` signal frame is observed
/// and every in-flight read has drained, then return that exit code.
pub async fn run(mut stdio: UnixStream, mut signals: UnixStream) -> Result<i32, ExitError> {
    let (mut stdio_read, mut stdio_write) = stdio.split();
    let mut stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();

    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
        .map_err(|e| ExitError::new(1, format!("failed to install SIGINT handler: {e}")))?;

    let mut parser = SignalParser::new();
    let mut stdout_buf = [0u8; BUF_SIZE];
    let mut stdin_buf = [0u8; BUF_SIZE];
    let mut signal_buf = [0u8; BUF_SIZE];

    let mut stdin_open = true;
    let mut stdio_open = true;
    let mut exit_code: Option<i32> = None;

    loop {
        if let Some(code) = exit_code {
            drain_remaining(&mut stdio_read, &mut stdout, &mut stdout_buf).await;
            return Ok(code.clamp(0, 255));
        }

        tokio::select! {
            result = stdio_read.read(&mut stdout_buf), if stdio_open => {
                let n = result.map_err(|e| ExitError::new(1, format!("stdio read failed: {e}")))?;
                if n == 0 {
                    stdio_open = false;
                    continue;
                }
                stdout
                    .write_all(&stdout_buf[..n])
                    .await
                    .map_err(|e| ExitError::new(1, format!("stdout write failed: {e}")))?;
                stdout.flush().await.ok();
            }
            result = stdin.read(&mut stdin_buf), if stdin_open => {
                let n = result.map_err(|e| ExitError::new(1, format!("stdin read failed: {e}")))?;
                if n == 0 {
                    stdin_open = false;
                    continue;
                }
                stdio_write
                    .write_all(&stdin_buf[..n])
                    .await
                    .map_err(|e| ExitError::new(1, format!("stdio write failed: {e}")))?;
            }
            result = signals.read(&mut signal_buf) => {
                let n = result.map_err(|e| ExitError::new(1, format!("signals read failed: {e}")))?;
                if n == 0 {
                    return Err(ExitError::new(1, "worker closed the signals socket without signalling exit"));
                }
                let frames = parser
                    .feed(&signal_buf[..n])
                    .map_err(|e| ExitError::new(1, format!("malformed signal frame: {e}")))?;
                for frame in frames {
                    match frame.name.as_str() {
                        "exit" => {
                            let code = frame
                                .exit_code()
                                .map_err(|e| ExitError::new(1, format!("malformed exit signal: {e}")))?;
                            exit_code = Some(code);
                        }
                        other => {
                            return Err(ExitError::new(1, format!("unrecognised signal frame: {other}")));
                        }
                    }
                }
            }
            _ = sigint.recv() => {
                if stdio_write.write_all(b"\x03").await.is_err() {
                    warn!("failed to relay SIGINT to worker");
                }
            }
        }
    }
}

/// Once an exit signal has arrived, grab anything the worker already
/// wrote to `stdio_sock` that just hasn't been read yet, without waiting
/// for more (the socket may never send more).
async fn drain_remaining(
    stdio_read: &mut tokio::net::unix::ReadHalf<'_>,
    stdout: &mut tokio::io::Stdout,
    buf: &mut [u8],
) {
    loop {
        match stdio_read.try_read(buf) {
            Ok(0) => break,
            Ok(n) => {
                let _ = stdout.write_all(&buf[..n]).await;
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
            Err(_) => break,
        }
    }
    let _ = stdout.flush().await;
}
