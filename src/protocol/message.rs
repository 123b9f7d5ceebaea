//! Message definitions
//!
//! The tagged value exchanged in both directions over the wire.

use bytes::Bytes;

/// Type tag leading every message on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    SimpleString = b'+',
    Error = b'-',
    Integer = b':',
    BulkString = b'$',
    Array = b'*',
    Map = b'%',
}

impl Tag {
    /// Resolve a leading byte to its tag
    pub fn from_byte(byte: u8) -> Option<Tag> {
        match byte {
            b'+' => Some(Tag::SimpleString),
            b'-' => Some(Tag::Error),
            b':' => Some(Tag::Integer),
            b'$' => Some(Tag::BulkString),
            b'*' => Some(Tag::Array),
            b'%' => Some(Tag::Map),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// A single protocol value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// One line of text, never containing CR or LF
    SimpleString(String),

    /// Error text; differs from `SimpleString` only by its tag
    Error(String),

    /// Signed integer
    Integer(i64),

    /// Length-prefixed bytes; `None` is the null marker, distinct from empty
    BulkString(Option<Bytes>),

    /// Ordered nested messages
    Array(Vec<Message>),

    /// Ordered key/value pairs; duplicate keys are kept
    Map(Vec<(Message, Message)>),
}

impl Message {
    /// Bulk string holding a copy of `data`
    pub fn bulk(data: impl AsRef<[u8]>) -> Self {
        Message::BulkString(Some(Bytes::copy_from_slice(data.as_ref())))
    }

    /// The null bulk string
    pub fn null() -> Self {
        Message::BulkString(None)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Message::Error(text.into())
    }

    /// Tag this message is framed with
    pub fn tag(&self) -> Tag {
        match self {
            Message::SimpleString(_) => Tag::SimpleString,
            Message::Error(_) => Tag::Error,
            Message::Integer(_) => Tag::Integer,
            Message::BulkString(_) => Tag::BulkString,
            Message::Array(_) => Tag::Array,
            Message::Map(_) => Tag::Map,
        }
    }

    /// Human-readable shape name, used in error text
    pub fn kind(&self) -> &'static str {
        match self {
            Message::SimpleString(_) => "simple string",
            Message::Error(_) => "error",
            Message::Integer(_) => "integer",
            Message::BulkString(Some(_)) => "bulk string",
            Message::BulkString(None) => "null",
            Message::Array(_) => "array",
            Message::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Message::BulkString(None))
    }

    /// Byte view of string-like variants
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Message::SimpleString(s) => Some(s.as_bytes()),
            Message::BulkString(Some(b)) => Some(b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Message::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<i64> for Message {
    fn from(value: i64) -> Self {
        Message::Integer(value)
    }
}

impl From<Bytes> for Message {
    fn from(value: Bytes) -> Self {
        Message::BulkString(Some(value))
    }
}

impl From<Option<Bytes>> for Message {
    fn from(value: Option<Bytes>) -> Self {
        Message::BulkString(value)
    }
}

impl From<Vec<Message>> for Message {
    fn from(items: Vec<Message>) -> Self {
        Message::Array(items)
    }
}
