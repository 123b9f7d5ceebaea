//! Codec Tests
//!
//! Tests for message encoding/decoding.

use std::io::Cursor;

use bytes::Bytes;
use tagkv::protocol::{
    decode, encode, read_message, write_message, DecodeLimits, Message, Tag,
};
use tagkv::TagError;

// =============================================================================
// Helper Functions
// =============================================================================

fn bulk(data: &str) -> Message {
    Message::bulk(data)
}

fn roundtrip(message: &Message) -> Message {
    let encoded = encode(message).unwrap();
    decode(&encoded).unwrap()
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_decode_simple_string() {
    assert_eq!(
        decode(b"+OK\r\n").unwrap(),
        Message::SimpleString("OK".to_string())
    );
}

#[test]
fn test_decode_error() {
    assert_eq!(
        decode(b"-unrecognized command: FOO\r\n").unwrap(),
        Message::Error("unrecognized command: FOO".to_string())
    );
}

#[test]
fn test_decode_integer() {
    assert_eq!(decode(b":1000\r\n").unwrap(), Message::Integer(1000));
    assert_eq!(decode(b":-42\r\n").unwrap(), Message::Integer(-42));
}

#[test]
fn test_decode_malformed_integer() {
    let err = decode(b":12abc\r\n").unwrap_err();
    assert!(matches!(err, TagError::Protocol(_)));
    assert!(err.to_string().contains("invalid integer"));
}

#[test]
fn test_decode_bulk_string() {
    assert_eq!(decode(b"$6\r\nfoobar\r\n").unwrap(), bulk("foobar"));
}

#[test]
fn test_decode_null_is_distinct_from_empty() {
    let null = decode(b"$-1\r\n").unwrap();
    let empty = decode(b"$0\r\n\r\n").unwrap();

    assert_eq!(null, Message::BulkString(None));
    assert_eq!(empty, Message::BulkString(Some(Bytes::new())));
    assert_ne!(null, empty);
}

#[test]
fn test_decode_null_consumes_nothing_after_length() {
    let mut cursor = Cursor::new(b"$-1\r\n:7\r\n".to_vec());
    let limits = DecodeLimits::default();

    assert!(read_message(&mut cursor, &limits).unwrap().is_null());
    assert_eq!(read_message(&mut cursor, &limits).unwrap(), Message::Integer(7));
}

#[test]
fn test_decode_bulk_string_is_binary_safe() {
    // Payload containing CRLF and non-UTF-8 bytes
    let payload: &[u8] = b"a\r\nb\xff\x00";
    let mut wire = format!("${}\r\n", payload.len()).into_bytes();
    wire.extend_from_slice(payload);
    wire.extend_from_slice(b"\r\n");

    assert_eq!(decode(&wire).unwrap(), Message::bulk(payload));
}

#[test]
fn test_decode_bulk_terminator_not_validated() {
    // The two bytes after the payload are discarded whatever they are
    let mut cursor = Cursor::new(b"$3\r\nabcXY:1\r\n".to_vec());
    let limits = DecodeLimits::default();

    assert_eq!(read_message(&mut cursor, &limits).unwrap(), bulk("abc"));
    assert_eq!(read_message(&mut cursor, &limits).unwrap(), Message::Integer(1));
}

#[test]
fn test_decode_array_of_bulk_strings() {
    let decoded = decode(b"*2\r\n$3\r\nGET\r\n$3\r\nkey\r\n").unwrap();
    assert_eq!(decoded, Message::Array(vec![bulk("GET"), bulk("key")]));
}

#[test]
fn test_decode_empty_array() {
    assert_eq!(decode(b"*0\r\n").unwrap(), Message::Array(vec![]));
}

#[test]
fn test_decode_nested_mixed_array() {
    let decoded = decode(b"*3\r\n:1\r\n*2\r\n+a\r\n$-1\r\n-e\r\n").unwrap();
    assert_eq!(
        decoded,
        Message::Array(vec![
            Message::Integer(1),
            Message::Array(vec![Message::SimpleString("a".to_string()), Message::null()]),
            Message::Error("e".to_string()),
        ])
    );
}

#[test]
fn test_decode_map_preserves_order_and_duplicates() {
    let decoded = decode(b"%3\r\n$1\r\nb\r\n:2\r\n$1\r\na\r\n:1\r\n$1\r\nb\r\n:3\r\n").unwrap();
    assert_eq!(
        decoded,
        Message::Map(vec![
            (bulk("b"), Message::Integer(2)),
            (bulk("a"), Message::Integer(1)),
            (bulk("b"), Message::Integer(3)),
        ])
    );
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_empty_stream_is_disconnect() {
    let err = decode(b"").unwrap_err();
    assert!(matches!(err, TagError::Disconnected));
    assert!(err.is_disconnect());
}

#[test]
fn test_unknown_tag_is_bad_request() {
    let err = decode(b"?what\r\n").unwrap_err();
    assert!(matches!(err, TagError::Protocol(_)));
    assert!(err.to_string().contains("unknown type tag 0x3f"));
}

#[test]
fn test_unknown_tag_skips_rest_of_line() {
    let mut cursor = Cursor::new(b"GET foo\r\n+PING\r\n".to_vec());
    let limits = DecodeLimits::default();

    assert!(matches!(
        read_message(&mut cursor, &limits),
        Err(TagError::Protocol(_))
    ));
    assert_eq!(
        read_message(&mut cursor, &limits).unwrap(),
        Message::SimpleString("PING".to_string())
    );
}

#[test]
fn test_unknown_tag_inside_array_consumes_whole_frame() {
    let mut cursor = Cursor::new(b"*2\r\n!x\r\n$3\r\nGET\r\n*1\r\n$5\r\nFLUSH\r\n".to_vec());
    let limits = DecodeLimits::default();

    let err = read_message(&mut cursor, &limits).unwrap_err();
    assert!(err.to_string().contains("unknown type tag 0x21"));

    // The next read starts at the following frame, not inside the bad one
    assert_eq!(
        read_message(&mut cursor, &limits).unwrap(),
        Message::Array(vec![bulk("FLUSH")])
    );
    assert!(matches!(
        read_message(&mut cursor, &limits),
        Err(TagError::Disconnected)
    ));
}

#[test]
fn test_truncated_frame_is_transport_error() {
    let err = decode(b"*2\r\n$3\r\nGET\r\n").unwrap_err();
    match err {
        TagError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("Expected IO error, got {:?}", other),
    }
}

#[test]
fn test_truncated_bulk_payload_is_transport_error() {
    let err = decode(b"$10\r\nabc").unwrap_err();
    assert!(matches!(err, TagError::Io(_)));
}

#[test]
fn test_huge_declared_bulk_without_payload_is_transport_error() {
    let err = decode(b"$536870912\r\n").unwrap_err();
    match err {
        TagError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("Expected IO error, got {:?}", other),
    }
}

#[test]
fn test_padded_numbers_rejected() {
    for wire in [&b": 5 \r\n"[..], &b":5 \r\n"[..], &b"$ 3\r\nabc\r\n"[..], &b"* 1\r\n:1\r\n"[..]] {
        let err = decode(wire).unwrap_err();
        assert!(matches!(err, TagError::Protocol(_)), "accepted {:?}", wire);
    }
}

#[test]
fn test_negative_array_count_rejected() {
    let err = decode(b"*-1\r\n").unwrap_err();
    assert!(matches!(err, TagError::Protocol(_)));
}

#[test]
fn test_bulk_length_below_null_rejected() {
    let err = decode(b"$-2\r\n").unwrap_err();
    assert!(matches!(err, TagError::Protocol(_)));
}

#[test]
fn test_depth_limit_enforced() {
    let limits = DecodeLimits {
        max_depth: 2,
        ..DecodeLimits::default()
    };

    let mut ok = Cursor::new(b"*1\r\n*1\r\n:1\r\n".to_vec());
    assert!(read_message(&mut ok, &limits).is_ok());

    let mut too_deep = Cursor::new(b"*1\r\n*1\r\n*1\r\n:1\r\n".to_vec());
    let err = read_message(&mut too_deep, &limits).unwrap_err();
    assert!(err.to_string().contains("nesting depth"));
}

#[test]
fn test_bulk_length_limit_enforced() {
    let limits = DecodeLimits {
        max_bulk_len: 4,
        ..DecodeLimits::default()
    };
    let mut cursor = Cursor::new(b"$5\r\nhello\r\n".to_vec());
    let err = read_message(&mut cursor, &limits).unwrap_err();
    assert!(err.to_string().contains("bulk string too large"));
}

#[test]
fn test_line_length_limit_enforced() {
    let limits = DecodeLimits {
        max_line_len: 8,
        ..DecodeLimits::default()
    };
    let mut cursor = Cursor::new(b"+this line is far too long\r\n".to_vec());
    let err = read_message(&mut cursor, &limits).unwrap_err();
    assert!(err.to_string().contains("line too long"));
}

#[test]
fn test_simple_string_must_be_utf8() {
    let err = decode(b"+\xff\xfe\r\n").unwrap_err();
    assert!(matches!(err, TagError::Protocol(_)));
}

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_wire_format_scalars() {
    assert_eq!(&encode(&Message::SimpleString("OK".into())).unwrap()[..], b"+OK\r\n");
    assert_eq!(&encode(&Message::Error("bad".into())).unwrap()[..], b"-bad\r\n");
    assert_eq!(&encode(&Message::Integer(-3)).unwrap()[..], b":-3\r\n");
    assert_eq!(&encode(&Message::null()).unwrap()[..], b"$-1\r\n");
    assert_eq!(&encode(&bulk("hi")).unwrap()[..], b"$2\r\nhi\r\n");
    assert_eq!(&encode(&bulk("")).unwrap()[..], b"$0\r\n\r\n");
}

#[test]
fn test_wire_format_array() {
    let message = Message::Array(vec![bulk("a"), Message::Integer(1), Message::null()]);
    assert_eq!(
        &encode(&message).unwrap()[..],
        b"*3\r\n$1\r\na\r\n:1\r\n$-1\r\n"
    );
}

#[test]
fn test_wire_format_map() {
    let message = Message::Map(vec![(bulk("k"), Message::Integer(9))]);
    assert_eq!(&encode(&message).unwrap()[..], b"%1\r\n$1\r\nk\r\n:9\r\n");
}

#[test]
fn test_encode_rejects_line_break_in_simple_string() {
    let err = encode(&Message::SimpleString("a\r\nb".into())).unwrap_err();
    assert!(matches!(err, TagError::Encode(_)));
    assert!(err.to_string().contains("simple string"));
}

#[test]
fn test_encode_rejects_nested_line_break_in_error() {
    let message = Message::Array(vec![bulk("ok"), Message::Error("x\ny".into())]);
    let err = encode(&message).unwrap_err();
    assert!(err.to_string().contains("error contains CR or LF"));
}

#[test]
fn test_failed_encode_writes_nothing() {
    let message = Message::Array(vec![bulk("ok"), Message::SimpleString("\r".into())]);
    let mut out = Vec::new();

    assert!(write_message(&mut out, &message).is_err());
    assert!(out.is_empty());
}

#[test]
fn test_roundtrip_nested_structure() {
    let message = Message::Array(vec![
        Message::Map(vec![
            (bulk("a"), Message::Array(vec![Message::Integer(i64::MIN), Message::null()])),
            (Message::Integer(1), Message::SimpleString("one".into())),
            (Message::Integer(1), Message::Error("dup".into())),
        ]),
        Message::bulk(b"\x00\r\n\xff"),
        Message::Array(vec![]),
        Message::Map(vec![]),
        Message::Integer(i64::MAX),
    ]);

    assert_eq!(roundtrip(&message), message);
}

#[test]
fn test_tag_bytes() {
    assert_eq!(Message::Integer(0).tag(), Tag::Integer);
    assert_eq!(Tag::from_byte(b'%'), Some(Tag::Map));
    assert_eq!(Tag::from_byte(b'#'), None);
    assert_eq!(Tag::BulkString.as_byte(), b'$');
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_stream_multiple_messages() {
    let messages = vec![
        Message::Array(vec![bulk("SET"), bulk("k"), bulk("v")]),
        Message::SimpleString("GET k".into()),
        Message::Integer(1),
        Message::null(),
    ];

    let mut buffer = Vec::new();
    for message in &messages {
        write_message(&mut buffer, message).unwrap();
    }

    let mut cursor = Cursor::new(buffer);
    let limits = DecodeLimits::default();
    for expected in &messages {
        assert_eq!(&read_message(&mut cursor, &limits).unwrap(), expected);
    }
    assert!(matches!(
        read_message(&mut cursor, &limits),
        Err(TagError::Disconnected)
    ));
}
