//! TCP Server
//!
//! Accepts connections and runs each session on its own thread.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use super::connection::Connection;
use crate::config::Config;
use crate::database::DatabaseRegistry;
use crate::error::{NestError, Result};
use crate::protocol::{write_response, Response};

/// How long the acceptor sleeps when no client is waiting
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Read halves of live sessions, so shutdown can unblock them
type ConnectionTable = Arc<Mutex<HashMap<u64, TcpStream>>>;

/// TCP server for nestdb
pub struct Server {
    config: Config,
    registry: Arc<DatabaseRegistry>,
    listener: Option<TcpListener>,
    shutdown: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
    connections: ConnectionTable,
}

impl Server {
    /// Create a new server with the given config and registry
    pub fn new(config: Config, registry: Arc<DatabaseRegistry>) -> Self {
        Self {
            config,
            registry,
            listener: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
            connections: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Bind the listening socket and return the bound address
    ///
    /// Useful with port 0. `run` binds on its own if this was not called.
    pub fn bind(&mut self) -> Result<SocketAddr> {
        if let Some(listener) = &self.listener {
            return Ok(listener.local_addr()?);
        }
        let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
            NestError::Network(format!("cannot listen on {}: {}", self.config.listen_addr, e))
        })?;
        // Poll-based accept so the shutdown flag is checked between clients
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        self.listener = Some(listener);
        Ok(addr)
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&mut self) -> Result<()> {
        let addr = self.bind()?;
        let listener = match self.listener.take() {
            Some(listener) => listener,
            None => return Err(NestError::Network("listener not bound".to_string())),
        };
        tracing::info!("nestdb listening on {}", addr);

        let mut handles: Vec<JoinHandle<()>> = Vec::new();
        let mut next_id: u64 = 0;

        while !self.shutdown.load(Ordering::Relaxed) {
            match listener.accept() {
                Ok((stream, peer)) => {
                    next_id += 1;
                    if let Some(handle) = self.admit(next_id, stream, peer) {
                        handles.push(handle);
                    }
                    handles.retain(|h| !h.is_finished());
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("accept error: {}", e);
                }
            }
        }

        tracing::info!("Shutdown requested, draining {} connection(s)", self.active_connections());

        // Unblock every session stuck in a read; they see EOF and finish
        for stream in self.connections.lock().values() {
            let _ = stream.shutdown(Shutdown::Read);
        }
        for handle in handles {
            let _ = handle.join();
        }

        tracing::info!("Shutdown complete");
        Ok(())
    }

    /// Spawn a session thread, or turn the client away at the cap
    fn admit(&self, id: u64, stream: TcpStream, peer: SocketAddr) -> Option<JoinHandle<()>> {
        if let Err(e) = stream.set_nonblocking(false) {
            tracing::warn!("Dropping connection from {}: {}", peer, e);
            return None;
        }

        if self.active.load(Ordering::SeqCst) >= self.config.max_connections {
            tracing::warn!(
                "Rejecting {}: {} connections already open",
                peer,
                self.config.max_connections
            );
            let mut stream = stream;
            let _ = write_response(&mut stream, &Response::error("Server is at connection capacity"));
            return None;
        }

        let read_half = match stream.try_clone() {
            Ok(read_half) => read_half,
            Err(e) => {
                tracing::warn!("Dropping connection from {}: {}", peer, e);
                return None;
            }
        };
        self.connections.lock().insert(id, read_half);
        self.active.fetch_add(1, Ordering::SeqCst);

        let guard = SessionGuard {
            id,
            active: Arc::clone(&self.active),
            connections: Arc::clone(&self.connections),
        };
        let registry = Arc::clone(&self.registry);
        let config = self.config.clone();

        let spawned = thread::Builder::new()
            .name(format!("nestdb-conn-{}", id))
            .spawn(move || {
                let _guard = guard;
                match Connection::new(stream, registry, &config) {
                    Ok(mut connection) => {
                        if let Err(e) = connection.handle() {
                            tracing::debug!("Connection {} ended with error: {}", peer, e);
                        }
                    }
                    Err(e) => tracing::warn!("Failed to set up connection {}: {}", peer, e),
                }
            });

        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                // The closure (and the guard inside it) is dropped on failure
                tracing::error!("Failed to spawn session thread for {}: {}", peer, e);
                None
            }
        }
    }

    /// Flag that stops the accept loop when set
    ///
    /// Suitable for `signal_hook::flag::register`.
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Number of sessions currently running
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn registry(&self) -> &Arc<DatabaseRegistry> {
        &self.registry
    }
}

/// Releases a session's slot when its thread finishes
struct SessionGuard {
    id: u64,
    active: Arc<AtomicUsize>,
    connections: ConnectionTable,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.connections.lock().remove(&self.id);
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}
