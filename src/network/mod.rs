//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Worker thread pool for connections (bounded)
//! - Requests routed through the Dispatcher

mod server;
mod connection;

pub use server::Server;
pub use connection::{serve, Connection};
