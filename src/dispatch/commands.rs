//! Command table
//!
//! Every supported command, its arity, and its handler.

use bytes::Bytes;

use crate::error::{Result, TagError};
use crate::protocol::Message;
use crate::store::Store;

/// Handler signature: positional arguments (command name excluded) in, reply out
pub type Handler = fn(&Store, Vec<Message>) -> Result<Message>;

/// Accepted argument counts for a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many arguments
    Exact(usize),

    /// At least this many arguments
    AtLeast(usize),

    /// Any even number of arguments, including zero
    Even,
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
            Arity::Even => count % 2 == 0,
        }
    }
}

/// One command table entry
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    /// Canonical uppercase name
    pub name: &'static str,
    pub arity: Arity,
    pub handler: Handler,
}

/// The full command table
pub static COMMANDS: &[CommandSpec] = &[
    CommandSpec { name: "GET", arity: Arity::Exact(1), handler: get },
    CommandSpec { name: "SET", arity: Arity::Exact(2), handler: set },
    CommandSpec { name: "DELETE", arity: Arity::Exact(1), handler: delete },
    CommandSpec { name: "FLUSH", arity: Arity::Exact(0), handler: flush },
    CommandSpec { name: "MGET", arity: Arity::AtLeast(0), handler: mget },
    CommandSpec { name: "MSET", arity: Arity::Even, handler: mset },
];

/// Find a command by name, ignoring ASCII case
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name))
}

// =============================================================================
// Handlers
// =============================================================================

fn get(store: &Store, args: Vec<Message>) -> Result<Message> {
    let key = only_key(&args, "GET")?;
    Ok(store.get(&key).unwrap_or(Message::BulkString(None)))
}

fn set(store: &Store, args: Vec<Message>) -> Result<Message> {
    let mut args = args.into_iter();
    let (key, value) = match (args.next(), args.next()) {
        (Some(key), Some(value)) => (key, value),
        _ => return Err(arity_error("SET")),
    };
    let key = key_of(&key)?;
    Ok(Message::Integer(store.set(key, value)))
}

fn delete(store: &Store, args: Vec<Message>) -> Result<Message> {
    let key = only_key(&args, "DELETE")?;
    Ok(Message::Integer(store.delete(&key)))
}

fn flush(store: &Store, _args: Vec<Message>) -> Result<Message> {
    Ok(Message::Integer(store.flush()))
}

fn mget(store: &Store, args: Vec<Message>) -> Result<Message> {
    let keys = args.iter().map(key_of).collect::<Result<Vec<_>>>()?;
    let values = store
        .mget(&keys)
        .into_iter()
        .map(|value| value.unwrap_or(Message::BulkString(None)))
        .collect();
    Ok(Message::Array(values))
}

fn mset(store: &Store, args: Vec<Message>) -> Result<Message> {
    if args.len() % 2 != 0 {
        return Err(arity_error("MSET"));
    }

    // Validate every key before the store sees any pair
    let mut pairs = Vec::with_capacity(args.len() / 2);
    let mut args = args.into_iter();
    while let (Some(key), Some(value)) = (args.next(), args.next()) {
        pairs.push((key_of(&key)?, value));
    }
    Ok(Message::Integer(store.mset(pairs)))
}

// =============================================================================
// Argument helpers
// =============================================================================

/// Keys are byte strings: bulk strings or simple strings
fn key_of(arg: &Message) -> Result<Bytes> {
    match arg {
        Message::BulkString(Some(bytes)) => Ok(bytes.clone()),
        Message::SimpleString(text) => Ok(Bytes::copy_from_slice(text.as_bytes())),
        other => Err(TagError::Command(format!(
            "invalid key: expected string, got {}",
            other.kind()
        ))),
    }
}

fn only_key(args: &[Message], name: &str) -> Result<Bytes> {
    match args {
        [key] => key_of(key),
        _ => Err(arity_error(name)),
    }
}

fn arity_error(name: &str) -> TagError {
    TagError::Command(format!("wrong number of arguments for '{}'", name))
}
