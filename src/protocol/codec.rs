//! Protocol codec
//!
//! Encoding and decoding of [`Message`] values.
//!
//! Decoding reads from any [`BufRead`] one message at a time, recursing into
//! arrays and maps. Encoding builds the whole reply in a [`BytesMut`] first
//! so a stream only ever sees complete messages.

use std::io::{BufRead, ErrorKind, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use super::{Message, Tag};
use crate::error::{Result, TagError};

const CRLF: &[u8] = b"\r\n";

/// Default nesting cap for arrays and maps
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default bulk string cap (512 MB)
pub const DEFAULT_MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Default text line cap (64 KB)
pub const DEFAULT_MAX_LINE_LEN: usize = 64 * 1024;

/// Upper bound on capacity reserved from a peer-declared element count
const MAX_PREALLOC: usize = 1024;

/// Upper bound on bytes reserved from a peer-declared bulk length
const MAX_BULK_PREALLOC: usize = 64 * 1024;

/// Resource limits applied while decoding untrusted input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Deepest array/map nesting accepted; a top-level scalar is depth 0
    pub max_depth: usize,

    /// Largest bulk string payload accepted
    pub max_bulk_len: usize,

    /// Largest text line accepted, terminator excluded
    pub max_line_len: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_bulk_len: DEFAULT_MAX_BULK_LEN,
            max_line_len: DEFAULT_MAX_LINE_LEN,
        }
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Read one complete message from a stream
///
/// - End-of-stream before the first byte: [`TagError::Disconnected`]
/// - End-of-stream inside a message: [`TagError::Io`] (`UnexpectedEof`)
/// - Malformed input: [`TagError::Protocol`]
///
/// An unknown tag nested inside an array or map still consumes the rest of
/// that frame, so one bad request yields exactly one error.
pub fn read_message<R: BufRead>(reader: &mut R, limits: &DecodeLimits) -> Result<Message> {
    let mut decoder = Decoder {
        reader,
        limits,
        bad_tag: None,
    };
    let message = decoder.message(0)?;
    match decoder.bad_tag {
        Some(byte) => Err(unknown_tag(byte)),
        None => Ok(message),
    }
}

/// Decode one message from a byte slice using default limits
pub fn decode(bytes: &[u8]) -> Result<Message> {
    let mut reader = bytes;
    read_message(&mut reader, &DecodeLimits::default())
}

struct Decoder<'a, R> {
    reader: &'a mut R,
    limits: &'a DecodeLimits,
    /// First unknown tag seen below the top level
    bad_tag: Option<u8>,
}

impl<R: BufRead> Decoder<'_, R> {
    fn message(&mut self, depth: usize) -> Result<Message> {
        let byte = match self.read_tag_byte()? {
            Some(byte) => byte,
            None if depth == 0 => return Err(TagError::Disconnected),
            None => return Err(std::io::Error::from(ErrorKind::UnexpectedEof).into()),
        };

        let tag = match Tag::from_byte(byte) {
            Some(tag) => tag,
            None => {
                // Drop the rest of the line so the next read starts fresh
                if byte != b'\n' {
                    self.skip_line()?;
                }
                if depth == 0 {
                    return Err(unknown_tag(byte));
                }
                // Keep the frame aligned; read_message reports it once done
                self.bad_tag.get_or_insert(byte);
                return Ok(Message::BulkString(None));
            }
        };

        match tag {
            Tag::SimpleString => Ok(Message::SimpleString(self.text_line()?)),
            Tag::Error => Ok(Message::Error(self.text_line()?)),
            Tag::Integer => self.integer(),
            Tag::BulkString => self.bulk_string(),
            Tag::Array => self.array(depth),
            Tag::Map => self.map(depth),
        }
    }

    fn integer(&mut self) -> Result<Message> {
        let line = self.line()?;
        parse_decimal(&line, "integer").map(Message::Integer)
    }

    fn bulk_string(&mut self) -> Result<Message> {
        let line = self.line()?;
        let len = parse_decimal(&line, "bulk string length")?;
        if len == -1 {
            return Ok(Message::BulkString(None));
        }
        if len < 0 {
            return Err(TagError::Protocol(format!(
                "invalid bulk string length {}",
                len
            )));
        }

        let len = len as u64;
        if len > self.limits.max_bulk_len as u64 {
            return Err(TagError::Protocol(format!(
                "bulk string too large: {} bytes (max {})",
                len, self.limits.max_bulk_len
            )));
        }

        // Grow with the bytes that actually arrive, not the declared length
        let mut payload = Vec::with_capacity((len as usize).min(MAX_BULK_PREALLOC));
        self.reader.by_ref().take(len).read_to_end(&mut payload)?;
        if (payload.len() as u64) < len {
            return Err(std::io::Error::from(ErrorKind::UnexpectedEof).into());
        }

        // Two terminator bytes follow the payload; their content is not checked
        let mut terminator = [0u8; 2];
        self.reader.read_exact(&mut terminator)?;

        Ok(Message::BulkString(Some(Bytes::from(payload))))
    }

    fn array(&mut self, depth: usize) -> Result<Message> {
        let count = self.count("array")?;
        self.check_depth(depth + 1)?;

        let mut items = Vec::with_capacity(count.min(MAX_PREALLOC));
        for _ in 0..count {
            items.push(self.message(depth + 1)?);
        }
        Ok(Message::Array(items))
    }

    fn map(&mut self, depth: usize) -> Result<Message> {
        let count = self.count("map")?;
        self.check_depth(depth + 1)?;

        let mut pairs = Vec::with_capacity(count.min(MAX_PREALLOC));
        for _ in 0..count {
            let key = self.message(depth + 1)?;
            let value = self.message(depth + 1)?;
            pairs.push((key, value));
        }
        Ok(Message::Map(pairs))
    }

    fn count(&mut self, what: &str) -> Result<usize> {
        let line = self.line()?;
        let count = parse_decimal(&line, what)?;
        usize::try_from(count)
            .map_err(|_| TagError::Protocol(format!("negative {} count {}", what, count)))
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.limits.max_depth {
            return Err(TagError::Protocol(format!(
                "nesting depth exceeds limit of {}",
                self.limits.max_depth
            )));
        }
        Ok(())
    }

    /// Read the tag byte; `None` on a clean end-of-stream
    fn read_tag_byte(&mut self) -> Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn text_line(&mut self) -> Result<String> {
        let line = self.line()?;
        String::from_utf8(line)
            .map_err(|_| TagError::Protocol("text line is not valid UTF-8".to_string()))
    }

    /// Read one line, stripping trailing CR/LF bytes
    fn line(&mut self) -> Result<Vec<u8>> {
        // Room for the content plus CRLF
        let limit = self.limits.max_line_len as u64 + 2;
        let mut line = Vec::new();
        let read = self
            .reader
            .by_ref()
            .take(limit)
            .read_until(b'\n', &mut line)?;

        if line.last() != Some(&b'\n') {
            if read as u64 == limit {
                return Err(TagError::Protocol(format!(
                    "line too long (max {} bytes)",
                    self.limits.max_line_len
                )));
            }
            return Err(std::io::Error::from(ErrorKind::UnexpectedEof).into());
        }

        while matches!(line.last(), Some(b'\r' | b'\n')) {
            line.pop();
        }
        Ok(line)
    }

    fn skip_line(&mut self) -> Result<()> {
        let mut discarded = Vec::new();
        self.reader
            .by_ref()
            .take(self.limits.max_line_len as u64 + 2)
            .read_until(b'\n', &mut discarded)?;
        Ok(())
    }
}

fn unknown_tag(byte: u8) -> TagError {
    TagError::Protocol(format!("unknown type tag 0x{:02x}", byte))
}

fn parse_decimal(line: &[u8], what: &str) -> Result<i64> {
    std::str::from_utf8(line)
        .ok()
        .and_then(|text| text.parse::<i64>().ok())
        .ok_or_else(|| {
            TagError::Protocol(format!(
                "invalid {}: {:?}",
                what,
                String::from_utf8_lossy(line)
            ))
        })
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a message into a fresh buffer
pub fn encode(message: &Message) -> Result<Bytes> {
    let mut buf = BytesMut::new();
    encode_into(message, &mut buf)?;
    Ok(buf.freeze())
}

/// Append the wire form of `message` to `buf`
///
/// On error `buf` may hold a partial encoding and should be discarded.
pub fn encode_into(message: &Message, buf: &mut BytesMut) -> Result<()> {
    match message {
        Message::SimpleString(text) => {
            put_text_line(buf, Tag::SimpleString, text, "simple string")?;
        }
        Message::Error(text) => {
            put_text_line(buf, Tag::Error, text, "error")?;
        }
        Message::Integer(value) => {
            put_header(buf, Tag::Integer, *value);
        }
        Message::BulkString(None) => {
            put_header(buf, Tag::BulkString, -1);
        }
        Message::BulkString(Some(data)) => {
            put_header(buf, Tag::BulkString, data.len() as i64);
            buf.put_slice(data);
            buf.put_slice(CRLF);
        }
        Message::Array(items) => {
            put_header(buf, Tag::Array, items.len() as i64);
            for item in items {
                encode_into(item, buf)?;
            }
        }
        Message::Map(pairs) => {
            put_header(buf, Tag::Map, pairs.len() as i64);
            for (key, value) in pairs {
                encode_into(key, buf)?;
                encode_into(value, buf)?;
            }
        }
    }
    Ok(())
}

fn put_header(buf: &mut BytesMut, tag: Tag, value: i64) {
    buf.put_u8(tag.as_byte());
    buf.put_slice(value.to_string().as_bytes());
    buf.put_slice(CRLF);
}

fn put_text_line(buf: &mut BytesMut, tag: Tag, text: &str, what: &str) -> Result<()> {
    if text.bytes().any(|b| b == b'\r' || b == b'\n') {
        return Err(TagError::Encode(format!(
            "{} contains CR or LF: {:?}",
            what, text
        )));
    }
    buf.put_u8(tag.as_byte());
    buf.put_slice(text.as_bytes());
    buf.put_slice(CRLF);
    Ok(())
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Encode a message and write it with a single flush
///
/// Nothing reaches the writer if encoding fails.
pub fn write_message<W: Write>(writer: &mut W, message: &Message) -> Result<()> {
    let bytes = encode(message)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
