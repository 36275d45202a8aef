// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The client/conductor handshake: a bit-exact binary layout (see module
//! docs in `lib.rs`), plus the cache-miss continuation and socket-paths
//! reply that follow it on the same connection.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ProtocolError;

pub const HANDSHAKE_MAGIC: u32 = 0x4A44_4301;

/// Sentinel byte the conductor sends in place of the socket-paths reply
/// when it needs the client to send its full environment.
const CACHE_MISS_SENTINEL: u8 = 0x3F;

const TTY_FLAG: u8 = 0b0000_0001;

/// The fields carried by the initial client->conductor frame. Environment
/// pairs are not included here: they arrive later, only on a cache miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeFields {
    pub tty: bool,
    pub pid: u32,
    pub cwd: String,
    pub env_fingerprint: u64,
    pub args: Vec<String>,
}

/// The two per-session socket paths the conductor hands back to the
/// client once a worker is ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketPaths {
    pub stdio_path: String,
    pub signals_path: String,
}

/// What followed the initial frame: either the conductor wants the full
/// environment (cache miss), or it already resolved one and is replying
/// with socket paths directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeAck {
    CacheMiss,
    SocketPaths(SocketPaths),
}

pub async fn write_handshake<W: AsyncWrite + Unpin>(
    writer: &mut W,
    fields: &HandshakeFields,
) -> Result<(), ProtocolError> {
    writer.write_u32_le(HANDSHAKE_MAGIC).await?;
    let flags = if fields.tty { TTY_FLAG } else { 0 };
    writer.write_u8(flags).await?;
    writer.write_all(&[0u8; 3]).await?;
    writer.write_u32_le(fields.pid).await?;
    write_len_prefixed(writer, fields.cwd.as_bytes()).await?;
    writer.write_u64_le(fields.env_fingerprint).await?;
    writer.write_u16_le(fields.args.len() as u16).await?;
    for arg in &fields.args {
        write_len_prefixed(writer, arg.as_bytes()).await?;
    }
    Ok(())
}

pub async fn read_handshake<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<HandshakeFields, ProtocolError> {
    let magic = reader.read_u32_le().await?;
    if magic != HANDSHAKE_MAGIC {
        return Err(ProtocolError::BadMagic);
    }
    let flags = reader.read_u8().await?;
    let tty = flags & TTY_FLAG != 0;
    let mut reserved = [0u8; 3];
    reader.read_exact(&mut reserved).await?;
    let pid = reader.read_u32_le().await?;
    let cwd = read_len_prefixed_string(reader).await?;
    let env_fingerprint = reader.read_u64_le().await?;
    let arg_count = reader.read_u16_le().await?;
    let mut args = Vec::with_capacity(arg_count as usize);
    for _ in 0..arg_count {
        args.push(read_len_prefixed_string(reader).await?);
    }
    Ok(HandshakeFields { tty, pid, cwd, env_fingerprint, args })
}

/// Client side: read the byte that follows the initial frame and decide
/// whether it is the cache-miss sentinel or the first byte of the
/// socket-paths reply's length prefix.
pub async fn read_handshake_ack<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<HandshakeAck, ProtocolError> {
    let first = reader.read_u8().await?;
    if first == CACHE_MISS_SENTINEL {
        return Ok(HandshakeAck::CacheMiss);
    }
    let second = reader.read_u8().await?;
    let stdio_len = u16::from_le_bytes([first, second]);
    let stdio_path = read_exact_string(reader, stdio_len).await?;
    let signals_path = read_len_prefixed_string(reader).await?;
    Ok(HandshakeAck::SocketPaths(SocketPaths { stdio_path, signals_path }))
}

pub async fn write_cache_miss_sentinel<W: AsyncWrite + Unpin>(
    writer: &mut W,
) -> Result<(), ProtocolError> {
    writer.write_u8(CACHE_MISS_SENTINEL).await?;
    Ok(())
}

pub async fn write_socket_paths<W: AsyncWrite + Unpin>(
    writer: &mut W,
    paths: &SocketPaths,
) -> Result<(), ProtocolError> {
    write_len_prefixed(writer, paths.stdio_path.as_bytes()).await?;
    write_len_prefixed(writer, paths.signals_path.as_bytes()).await?;
    Ok(())
}

/// Client side: after a cache miss, read the socket-paths reply with no
/// sentinel ambiguity (the conductor never sends another sentinel here).
pub async fn read_socket_paths<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<SocketPaths, ProtocolError> {
    let stdio_path = read_len_prefixed_string(reader).await?;
    let signals_path = read_len_prefixed_string(reader).await?;
    Ok(SocketPaths { stdio_path, signals_path })
}

pub async fn write_env_pairs<W: AsyncWrite + Unpin>(
    writer: &mut W,
    env: &[(String, String)],
) -> Result<(), ProtocolError> {
    writer.write_u16_le(env.len() as u16).await?;
    for (k, v) in env {
        write_len_prefixed(writer, k.as_bytes()).await?;
        write_len_prefixed(writer, v.as_bytes()).await?;
    }
    Ok(())
}

pub async fn read_env_pairs<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<Vec<(String, String)>, ProtocolError> {
    let count = reader.read_u16_le().await?;
    let mut pairs = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let k = read_len_prefixed_string(reader).await?;
        let v = read_len_prefixed_string(reader).await?;
        pairs.push((k, v));
    }
    Ok(pairs)
}

async fn write_len_prefixed<W: AsyncWrite + Unpin>(
    writer: &mut W,
    bytes: &[u8],
) -> Result<(), ProtocolError> {
    writer.write_u16_le(bytes.len() as u16).await?;
    writer.write_all(bytes).await?;
    Ok(())
}

async fn read_len_prefixed_string<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<String, ProtocolError> {
    let len = reader.read_u16_le().await?;
    read_exact_string(reader, len).await
}

async fn read_exact_string<R: AsyncRead + Unpin>(
    reader: &mut R,
    len: u16,
) -> Result<String, ProtocolError> {
    let mut buf = vec![0u8; len as usize];
    reader.read_exact(&mut buf).await?;
    Ok(std::str::from_utf8(&buf)?.to_string())
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
