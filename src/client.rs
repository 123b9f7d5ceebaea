//! Client
//!
//! Blocking client for a TagKV server. One request, one reply per call.
//!
//! Replies are decoded with the same codec as requests, but any decode
//! failure here is fatal: once a reply is malformed, nothing after it on
//! the stream can be trusted.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use bytes::Bytes;

use crate::error::{Result, TagError};
use crate::protocol::{read_message, write_message, DecodeLimits, Message};

/// A connection to a TagKV server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    limits: DecodeLimits,
}

impl Client {
    /// Connect to a server
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            limits: DecodeLimits::default(),
        })
    }

    /// Send any message and return the raw reply
    pub fn request(&mut self, message: &Message) -> Result<Message> {
        write_message(&mut self.writer, message)?;
        read_message(&mut self.reader, &self.limits)
    }

    /// Send a command as an array of bulk strings and return the raw reply
    ///
    /// Error replies are returned as `Message::Error`, not as `Err`.
    pub fn execute(&mut self, args: &[&[u8]]) -> Result<Message> {
        let request = Message::Array(args.iter().map(Message::bulk).collect());
        self.request(&request)
    }

    /// GET: value or `None` when the key is absent
    pub fn get(&mut self, key: &[u8]) -> Result<Option<Bytes>> {
        match self.command(&[b"GET".as_slice(), key])? {
            Message::BulkString(value) => Ok(value),
            other => Err(unexpected("GET", &other)),
        }
    }

    pub fn set(&mut self, key: &[u8], value: &[u8]) -> Result<i64> {
        let reply = self.command(&[b"SET".as_slice(), key, value])?;
        integer_reply("SET", reply)
    }

    /// DELETE: 1 when the key existed
    pub fn delete(&mut self, key: &[u8]) -> Result<i64> {
        let reply = self.command(&[b"DELETE".as_slice(), key])?;
        integer_reply("DELETE", reply)
    }

    /// FLUSH: number of entries removed
    pub fn flush(&mut self) -> Result<i64> {
        let reply = self.command(&[b"FLUSH".as_slice()])?;
        integer_reply("FLUSH", reply)
    }

    pub fn mget(&mut self, keys: &[&[u8]]) -> Result<Vec<Option<Bytes>>> {
        let mut args: Vec<&[u8]> = Vec::with_capacity(keys.len() + 1);
        args.push(b"MGET");
        args.extend_from_slice(keys);

        match self.command(&args)? {
            Message::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Message::BulkString(value) => Ok(value),
                    other => Err(unexpected("MGET", &other)),
                })
                .collect(),
            other => Err(unexpected("MGET", &other)),
        }
    }

    /// MSET: number of pairs written
    pub fn mset(&mut self, pairs: &[(&[u8], &[u8])]) -> Result<i64> {
        let mut args: Vec<&[u8]> = Vec::with_capacity(pairs.len() * 2 + 1);
        args.push(b"MSET");
        for (key, value) in pairs {
            args.push(*key);
            args.push(*value);
        }
        let reply = self.command(&args)?;
        integer_reply("MSET", reply)
    }

    /// Like `execute`, but error replies become `TagError::Reply`
    fn command(&mut self, args: &[&[u8]]) -> Result<Message> {
        match self.execute(args)? {
            Message::Error(msg) => Err(TagError::Reply(msg)),
            reply => Ok(reply),
        }
    }
}

fn integer_reply(command: &str, reply: Message) -> Result<i64> {
    match reply {
        Message::Integer(n) => Ok(n),
        other => Err(unexpected(command, &other)),
    }
}

fn unexpected(command: &str, reply: &Message) -> TagError {
    TagError::Protocol(format!("unexpected {} reply to {}", reply.kind(), command))
}
