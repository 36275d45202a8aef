// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parses_one_whole_frame() {
    let mut parser = SignalParser::new();
    let frame = SignalFrame::exit(0);
    let frames = parser.feed(&frame.encode()).expect("feed");
    assert_eq!(frames, vec![frame]);
}

#[test]
fn parses_frame_split_across_feeds() {
    let mut parser = SignalParser::new();
    let encoded = SignalFrame::exit(42).encode();
    let (first, second) = encoded.split_at(3);
    assert!(parser.feed(first).expect("feed1").is_empty());
    let frames = parser.feed(second).expect("feed2");
    assert_eq!(frames, vec![SignalFrame::exit(42)]);
}

#[test]
fn parses_frame_split_byte_by_byte() {
    let mut parser = SignalParser::new();
    let encoded = SignalFrame::exit(7).encode();
    let mut frames = Vec::new();
    for byte in encoded {
        frames.extend(parser.feed(&[byte]).expect("feed"));
    }
    assert_eq!(frames, vec![SignalFrame::exit(7)]);
}

#[test]
fn parses_multiple_frames_in_one_feed() {
    let mut parser = SignalParser::new();
    let mut buf = SignalFrame::exit(1).encode();
    buf.extend(SignalFrame::exit(2).encode());
    let frames = parser.feed(&buf).expect("feed");
    assert_eq!(frames, vec![SignalFrame::exit(1), SignalFrame::exit(2)]);
}

#[test]
fn rejects_stream_not_starting_with_soh() {
    let mut parser = SignalParser::new();
    let err = parser.feed(b"exit").unwrap_err();
    assert!(matches!(err, ProtocolError::MalformedSignal(_)));
}

#[test]
fn rejects_duplicate_stx_in_one_frame() {
    let mut parser = SignalParser::new();
    let err = parser.feed(b"\x01exit\x02\x0242\x04").unwrap_err();
    assert!(matches!(err, ProtocolError::MalformedSignal(_)));
}

#[test]
fn rejects_eot_without_stx() {
    let mut parser = SignalParser::new();
    let err = parser.feed(b"\x01exit\x04").unwrap_err();
    assert!(matches!(err, ProtocolError::MalformedSignal(_)));
}

#[test]
fn exit_code_parses_decimal_data() {
    let frame = SignalFrame::exit(-1);
    assert_eq!(frame.exit_code().expect("parse"), -1);
}
