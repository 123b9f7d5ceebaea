//! # TagKV
//!
//! An in-memory key-value server with:
//! - A type-prefixed, binary-safe wire protocol (strings, errors, integers,
//!   bulk strings, arrays, maps)
//! - A static command table (GET, SET, DELETE, FLUSH, MGET, MSET)
//! - One shared store, every operation atomic under a single lock
//! - A bounded worker pool serving many TCP clients
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │          (Acceptor + bounded worker pool)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ one connection loop per client
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Codec                                   │
//! │          bytes ⇄ Message (recursive, tag-prefixed)           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Dispatcher                                 │
//! │        (command table, arity checks, error replies)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!                ┌─────────────┐
//!                │    Store    │
//!                │  (RwLock)   │
//!                └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod store;
pub mod dispatch;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{TagError, Result};
pub use config::Config;
pub use protocol::Message;
pub use store::Store;
pub use dispatch::Dispatcher;
pub use network::Server;
pub use client::Client;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of TagKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
