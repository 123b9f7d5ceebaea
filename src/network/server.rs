//! TCP Server
//!
//! Accepts connections and dispatches them to a fixed pool of worker threads.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, SendTimeoutError};

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::store::Store;

use super::Connection;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// TCP server for TagKV
///
/// ## Threading
/// - One acceptor (the thread calling [`Server::run`]) polls a non-blocking
///   listener so it can notice [`Server::shutdown`]
/// - `max_connections` workers each serve one connection at a time; accepted
///   sockets wait in a bounded queue until a worker is free
pub struct Server {
    config: Config,
    dispatcher: Dispatcher,
    listener: TcpListener,
    shutdown: Arc<AtomicBool>,
}

impl Server {
    /// Bind the listening socket; the server does not accept until [`run`](Self::run)
    pub fn bind(config: Config, store: Arc<Store>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(config.listen_addr())?;
        listener.set_nonblocking(true)?;
        tracing::info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            config,
            dispatcher: Dispatcher::new(store),
            listener,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Start serving (blocking until [`shutdown`](Self::shutdown))
    ///
    /// Connections already handed to a worker run until their client leaves.
    pub fn run(&self) -> Result<()> {
        let (tx, rx) = channel::bounded::<TcpStream>(self.config.max_connections);

        for id in 0..self.config.max_connections {
            let rx = rx.clone();
            let dispatcher = self.dispatcher.clone();
            let config = self.config.clone();
            thread::Builder::new()
                .name(format!("tagkv-worker-{}", id))
                .spawn(move || worker_loop(rx, dispatcher, config))?;
        }
        drop(rx);

        tracing::info!(
            "Serving with {} worker(s) on {}",
            self.config.max_connections,
            self.local_addr()?
        );

        while !self.shutdown.load(Ordering::Relaxed) {
            let mut stream = match self.listener.accept() {
                Ok((stream, addr)) => {
                    tracing::trace!("Accepted connection from {}", addr);
                    stream
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                    continue;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    // Per-connection accept failures (e.g. aborted handshake) are not fatal
                    tracing::warn!("Accept failed: {}", e);
                    continue;
                }
            };

            if let Err(e) = stream.set_nonblocking(false) {
                tracing::warn!("Dropping connection, cannot make socket blocking: {}", e);
                continue;
            }

            // Queue for a worker, re-checking shutdown while the pool is saturated
            loop {
                match tx.send_timeout(stream, ACCEPT_POLL_INTERVAL) {
                    Ok(()) => break,
                    Err(SendTimeoutError::Timeout(returned)) => {
                        if self.shutdown.load(Ordering::Relaxed) {
                            break;
                        }
                        stream = returned;
                    }
                    Err(SendTimeoutError::Disconnected(_)) => {
                        tracing::error!("All workers exited; stopping acceptor");
                        return Ok(());
                    }
                }
            }
        }

        tracing::info!("Server stopped accepting connections");
        Ok(())
    }

    /// Signal the server to stop accepting connections
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Whether shutdown has been requested
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn worker_loop(rx: Receiver<TcpStream>, dispatcher: Dispatcher, config: Config) {
    // Ends once the acceptor drops its sender
    for stream in rx.iter() {
        let mut connection = match Connection::new(stream, dispatcher.clone(), &config) {
            Ok(connection) => connection,
            Err(e) => {
                tracing::warn!("Failed to set up connection: {}", e);
                continue;
            }
        };

        if let Err(e) = connection.handle() {
            tracing::warn!("Connection {} closed with error: {}", connection.peer_addr(), e);
        }
    }
}
