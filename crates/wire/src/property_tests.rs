// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property tests for the testable invariants around wire framing.

use proptest::prelude::*;

use crate::frame::{read_handshake, write_handshake, HandshakeFields};
use crate::signal::{SignalFrame, SignalParser};

fn arb_handshake_fields() -> impl Strategy<Value = HandshakeFields> {
    (
        any::<bool>(),
        any::<u32>(),
        "[a-zA-Z0-9/_.-]{0,64}",
        any::<u64>(),
        proptest::collection::vec("[a-zA-Z0-9=_.-]{0,32}", 0..8),
    )
        .prop_map(|(tty, pid, cwd, env_fingerprint, args)| HandshakeFields {
            tty,
            pid,
            cwd,
            env_fingerprint,
            args,
        })
}

proptest! {
    /// Invariant: encoding then decoding any valid initial frame yields the
    /// same `ClientInfo`-equivalent fields.
    #[test]
    fn round_trip_framing(fields in arb_handshake_fields()) {
        let rt = tokio::runtime::Runtime::new().expect("runtime");
        rt.block_on(async {
            let mut buf = Vec::new();
            write_handshake(&mut buf, &fields).await.expect("write");
            let mut cursor = &buf[..];
            let decoded = read_handshake(&mut cursor).await.expect("read");
            prop_assert_eq!(decoded, fields);
            Ok(())
        })?;
    }

    /// Invariant: for any split of a byte stream containing k well-formed
    /// signal frames into arbitrary chunks, the parser emits exactly k
    /// frames in order, regardless of fragmentation.
    #[test]
    fn signal_parser_resilient_to_fragmentation(
        codes in proptest::collection::vec(-128i32..128, 0..6),
        split_points in proptest::collection::vec(0usize..4096, 0..32),
    ) {
        let mut stream = Vec::new();
        for code in &codes {
            stream.extend(SignalFrame::exit(*code).encode());
        }

        let mut chunks: Vec<usize> = split_points
            .into_iter()
            .map(|p| p % (stream.len() + 1))
            .collect();
        chunks.sort_unstable();
        chunks.dedup();

        let mut parser = SignalParser::new();
        let mut frames = Vec::new();
        let mut prev = 0;
        for &cut in &chunks {
            frames.extend(parser.feed(&stream[prev..cut]).expect("feed"));
            prev = cut;
        }
        frames.extend(parser.feed(&stream[prev..]).expect("feed"));

        prop_assert_eq!(frames.len(), codes.len());
        for (frame, code) in frames.iter().zip(codes.iter()) {
            prop_assert_eq!(&frame.name, "exit");
            prop_assert_eq!(frame.exit_code().expect("decimal"), *code);
        }
    }
}
