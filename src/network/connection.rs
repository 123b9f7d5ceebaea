//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::net::TcpStream;

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::{Result, TagError};
use crate::protocol::{read_message, write_message, DecodeLimits, Message};

/// Reply sent when a command result cannot be put on the wire
const ENCODE_FAILURE_REPLY: &str = "internal error: reply could not be encoded";

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Shared command dispatcher
    dispatcher: Dispatcher,

    /// Limits applied to every request
    limits: DecodeLimits,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O and configures timeouts
    pub fn new(stream: TcpStream, dispatcher: Dispatcher, config: &Config) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;
        stream.set_read_timeout(config.read_timeout())?;
        stream.set_write_timeout(config.write_timeout())?;

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            dispatcher,
            limits: config.decode_limits(),
            peer_addr,
        })
    }

    /// Handle the connection (blocking until closed)
    pub fn handle(&mut self) -> Result<()> {
        serve(
            &mut self.reader,
            &mut self.writer,
            &self.dispatcher,
            &self.limits,
            &self.peer_addr,
        )
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

/// Run the request/reply loop over any duplex byte stream
///
/// Decodes one request, dispatches it, writes one reply, repeatedly.
/// Protocol and command errors become error replies and the loop continues.
/// Returns `Ok(())` when the peer goes away (disconnect, reset, idle
/// timeout) and `Err` only for other transport failures.
pub fn serve<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    dispatcher: &Dispatcher,
    limits: &DecodeLimits,
    peer_addr: &str,
) -> Result<()> {
    tracing::debug!("Connection established from {}", peer_addr);

    loop {
        let reply = match read_message(reader, limits) {
            Ok(request) => {
                tracing::trace!("Received request from {}: {:?}", peer_addr, request);
                match dispatcher.execute(request) {
                    Ok(reply) => reply,
                    Err(TagError::Command(msg)) => Message::Error(msg),
                    Err(e) => Message::Error(e.to_string()),
                }
            }
            Err(TagError::Protocol(msg)) => {
                tracing::warn!("Bad request from {}: {}", peer_addr, msg);
                Message::Error(format!("bad request: {}", msg))
            }
            Err(e) if e.is_disconnect() => {
                tracing::debug!("Client {} disconnected", peer_addr);
                return Ok(());
            }
            Err(TagError::Io(ref e))
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                // Idle timeout (Windows reports TimedOut instead of WouldBlock)
                tracing::debug!("Read timeout for client {}", peer_addr);
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("Error reading from {}: {}", peer_addr, e);
                return Err(e);
            }
        };

        if let Err(e) = send_reply(writer, &reply, peer_addr) {
            if e.is_disconnect() {
                tracing::debug!(
                    "Client {} disconnected before reply could be sent: {}",
                    peer_addr,
                    e
                );
                return Ok(());
            }
            tracing::warn!("Error writing to {}: {}", peer_addr, e);
            return Err(e);
        }
    }
}

fn send_reply<W: Write>(writer: &mut W, reply: &Message, peer_addr: &str) -> Result<()> {
    match write_message(writer, reply) {
        Err(TagError::Encode(msg)) => {
            tracing::error!("Dropping unencodable reply for {}: {}", peer_addr, msg);
            write_message(writer, &Message::Error(ENCODE_FAILURE_REPLY.to_string()))
        }
        other => other,
    }
}
