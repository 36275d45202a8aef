// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn round_trips_handshake_fields() {
    let fields = HandshakeFields {
        tty: true,
        pid: 4242,
        cwd: "/home/user/project".to_string(),
        env_fingerprint: 0xDEAD_BEEF_CAFE_F00D,
        args: vec!["-e".to_string(), "1+1".to_string()],
    };

    let mut buf = Vec::new();
    write_handshake(&mut buf, &fields).await.expect("write");

    assert_eq!(&buf[0..4], &HANDSHAKE_MAGIC.to_le_bytes());

    let mut cursor = &buf[..];
    let decoded = read_handshake(&mut cursor).await.expect("read");
    assert_eq!(decoded, fields);
}

#[tokio::test]
async fn rejects_bad_magic() {
    let buf = vec![0u8; 32];
    let mut cursor = &buf[..];
    let err = read_handshake(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::BadMagic));
}

#[tokio::test]
async fn ack_distinguishes_cache_miss_from_socket_paths() {
    let mut miss_buf = Vec::new();
    write_cache_miss_sentinel(&mut miss_buf).await.expect("write sentinel");
    let mut cursor = &miss_buf[..];
    assert_eq!(read_handshake_ack(&mut cursor).await.expect("read"), HandshakeAck::CacheMiss);

    let paths = SocketPaths {
        stdio_path: "/run/jd/worker-1/stdio.sock".to_string(),
        signals_path: "/run/jd/worker-1/signals.sock".to_string(),
    };
    let mut paths_buf = Vec::new();
    write_socket_paths(&mut paths_buf, &paths).await.expect("write paths");
    let mut cursor = &paths_buf[..];
    assert_eq!(
        read_handshake_ack(&mut cursor).await.expect("read"),
        HandshakeAck::SocketPaths(paths.clone())
    );

    let mut cursor = &paths_buf[..];
    assert_eq!(read_socket_paths(&mut cursor).await.expect("read"), paths);
}

#[tokio::test]
async fn round_trips_env_pairs() {
    let env = vec![
        ("PATH".to_string(), "/usr/bin".to_string()),
        ("HOME".to_string(), "/home/user".to_string()),
    ];
    let mut buf = Vec::new();
    write_env_pairs(&mut buf, &env).await.expect("write");
    let mut cursor = &buf[..];
    let decoded = read_env_pairs(&mut cursor).await.expect("read");
    assert_eq!(decoded, env);
}

#[tokio::test]
async fn empty_args_and_env_round_trip() {
    let fields = HandshakeFields {
        tty: false,
        pid: 1,
        cwd: "/".to_string(),
        env_fingerprint: 0,
        args: vec![],
    };
    let mut buf = Vec::new();
    write_handshake(&mut buf, &fields).await.expect("write");
    let mut cursor = &buf[..];
    assert_eq!(read_handshake(&mut cursor).await.expect("read"), fields);
}
