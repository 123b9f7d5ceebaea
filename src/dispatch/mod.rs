//! Dispatch Module
//!
//! Turns a decoded request into a reply by way of a static command table.
//!
//! ## Request Shapes
//! - `Array` of arguments: the first element names the command
//! - `SimpleString` inline command: split on whitespace into arguments
//!
//! Anything else is rejected as a command error. Command names are matched
//! case-insensitively; arguments are handed to the command exactly as
//! received.

mod commands;

use std::sync::Arc;

use bytes::Bytes;

use crate::error::{Result, TagError};
use crate::protocol::Message;
use crate::store::Store;

pub use commands::{lookup, Arity, CommandSpec, Handler, COMMANDS};

/// Routes requests to command handlers against a shared store
#[derive(Debug, Clone)]
pub struct Dispatcher {
    store: Arc<Store>,
}

impl Dispatcher {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Execute one request, returning the reply
    ///
    /// A rejected request leaves the store untouched.
    pub fn execute(&self, request: Message) -> Result<Message> {
        let args = match request {
            Message::Array(items) => items,
            Message::SimpleString(line) => split_inline(&line),
            other => {
                return Err(TagError::Command(format!(
                    "invalid request: expected array or inline command, got {}",
                    other.kind()
                )))
            }
        };

        let mut args = args.into_iter();
        let name = match args.next() {
            Some(name) => command_name(&name)?,
            None => return Err(TagError::Command("missing command".to_string())),
        };

        let spec = lookup(&name)
            .ok_or_else(|| TagError::Command(format!("unrecognized command: {}", name)))?;

        let args: Vec<Message> = args.collect();
        if !spec.arity.accepts(args.len()) {
            return Err(TagError::Command(format!(
                "wrong number of arguments for '{}'",
                spec.name
            )));
        }

        tracing::trace!("Dispatching {} with {} argument(s)", spec.name, args.len());
        (spec.handler)(&self.store, args)
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }
}

fn split_inline(line: &str) -> Vec<Message> {
    line.split_whitespace()
        .map(|token| Message::BulkString(Some(Bytes::copy_from_slice(token.as_bytes()))))
        .collect()
}

fn command_name(message: &Message) -> Result<String> {
    match message.as_bytes() {
        Some(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        None => Err(TagError::Command(format!(
            "invalid command name: expected string, got {}",
            message.kind()
        ))),
    }
}
