//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Wire Format
//!
//! Every message starts with a one-byte type tag. All text and length lines
//! end in CRLF.
//!
//! ```text
//! ┌──────┬──────────────┬────────────────────────────────────────────┐
//! │ Tag  │ Variant      │ Framing                                    │
//! ├──────┼──────────────┼────────────────────────────────────────────┤
//! │  +   │ SimpleString │ text CRLF                                  │
//! │  -   │ Error        │ text CRLF                                  │
//! │  :   │ Integer      │ decimal CRLF                               │
//! │  $   │ BulkString   │ len CRLF bytes CRLF   (len -1 = null)      │
//! │  *   │ Array        │ count CRLF, then count messages            │
//! │  %   │ Map          │ count CRLF, then 2×count messages (k,v,..) │
//! └──────┴──────────────┴────────────────────────────────────────────┘
//! ```
//!
//! ### Requests
//! An array of bulk strings, first element the command name:
//! `*2\r\n$3\r\nGET\r\n$3\r\nkey\r\n`. A simple string such as
//! `+GET key\r\n` is also accepted and split on whitespace.

mod message;
mod codec;

pub use message::{Message, Tag};
pub use codec::{
    decode, encode, encode_into, read_message, write_message, DecodeLimits,
    DEFAULT_MAX_BULK_LEN, DEFAULT_MAX_DEPTH, DEFAULT_MAX_LINE_LEN,
};
