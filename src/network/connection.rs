//! Connection Handler
//!
//! Runs the protocol state machine for one client.
//!
//! ```text
//!  AwaitingDatabaseName ──name ok──► Ready ──EXIT / EOF / transport error──► Closed
//!          │                          │ ▲
//!          └──empty / invalid name────┼─┼──────────────────────────────────► Closed
//!                                     └─┘ command → response (errors included)
//! ```

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::database::{Database, DatabaseRegistry, Outcome};
use crate::error::{NestError, Result};
use crate::protocol::{
    parse_request, read_handshake, read_line, write_response, write_text_line, Command,
    Request, Response, GOODBYE, WELCOME_PREFIX,
};

/// Where a session is in the protocol
#[derive(Clone)]
pub enum SessionState {
    /// Waiting for the first message (database name)
    AwaitingDatabaseName,

    /// Bound to a database, processing commands
    Ready(Arc<Database>),

    /// Finished; nothing more is read
    Closed,
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::AwaitingDatabaseName => f.write_str("AwaitingDatabaseName"),
            SessionState::Ready(db) => write!(f, "Ready({})", db.name()),
            SessionState::Closed => f.write_str("Closed"),
        }
    }
}

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Shared table of open databases
    registry: Arc<DatabaseRegistry>,

    /// Protocol state
    state: SessionState,

    /// Longest accepted message
    max_message_bytes: usize,

    /// Soft per-operation deadline
    op_timeout: Duration,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O and the write timeout. Reads have no timeout:
    /// a client may sit idle between commands for as long as it likes.
    pub fn new(stream: TcpStream, registry: Arc<DatabaseRegistry>, config: &Config) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            registry,
            state: SessionState::AwaitingDatabaseName,
            max_message_bytes: config.max_message_bytes,
            op_timeout: config.op_timeout(),
            peer_addr,
        })
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Returns `Ok(())` when the session ends normally or the client simply
    /// goes away; other transport failures are returned as errors.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        let result = self.run();
        self.state = SessionState::Closed;

        match result {
            Err(e) if e.is_disconnect() => {
                tracing::debug!("Client {} disconnected: {}", self.peer_addr, e);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Session with {} failed: {}", self.peer_addr, e);
                Err(e)
            }
            Ok(()) => {
                tracing::debug!("Connection closed for {}", self.peer_addr);
                Ok(())
            }
        }
    }

    fn run(&mut self) -> Result<()> {
        loop {
            match &self.state {
                SessionState::AwaitingDatabaseName => self.await_database_name()?,
                SessionState::Ready(db) => {
                    let db = Arc::clone(db);
                    self.serve_command(&db)?;
                }
                SessionState::Closed => return Ok(()),
            }
        }
    }

    /// AwaitingDatabaseName: bind the session to a database or close it
    fn await_database_name(&mut self) -> Result<()> {
        let name = match read_handshake(&mut self.reader, self.max_message_bytes) {
            Ok(Some(name)) => name,
            Ok(None) => {
                tracing::debug!("Client {} left before naming a database", self.peer_addr);
                self.state = SessionState::Closed;
                return Ok(());
            }
            Err(e) if e.is_disconnect() => return Err(e),
            Err(e) => {
                self.state = SessionState::Closed;
                return self.send_response(&Response::error(e.to_string()));
            }
        };
        let name = name.trim();

        match self.registry.resolve(name) {
            Ok(db) => {
                write_text_line(&mut self.writer, &format!("{}{}", WELCOME_PREFIX, name))?;
                tracing::info!("Client {} connected to database {}", self.peer_addr, name);
                self.state = SessionState::Ready(db);
                Ok(())
            }
            Err(e) => {
                tracing::debug!("Rejected database name from {}: {}", self.peer_addr, e);
                self.state = SessionState::Closed;
                self.send_response(&Response::error(e.to_string()))
            }
        }
    }

    /// Ready: read one line, answer it
    fn serve_command(&mut self, db: &Database) -> Result<()> {
        let line = match read_line(&mut self.reader, self.max_message_bytes) {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::debug!(
                    "Client {} disconnected from database {}",
                    self.peer_addr,
                    db.name()
                );
                self.state = SessionState::Closed;
                return Ok(());
            }
            Err(e @ NestError::Protocol(_)) => {
                // Oversized message: framing is lost, report and hang up
                self.state = SessionState::Closed;
                return self.send_response(&Response::error(e.to_string()));
            }
            Err(e) if e.is_transport() => return Err(e),
            Err(e) => return self.send_response(&Response::error(e.to_string())),
        };

        tracing::trace!("Received command from {}: {}", self.peer_addr, line);

        let response = match parse_request(&line) {
            Ok(Request::Exit) => {
                self.state = SessionState::Closed;
                return write_text_line(&mut self.writer, GOODBYE);
            }
            Ok(Request::Command(command)) => dispatch(db, &command, self.op_timeout),
            Err(e) => Response::error(e.to_string()),
        };

        tracing::trace!(
            "Sending response to {}: {:?} - {}",
            self.peer_addr,
            response.status,
            response.message
        );
        self.send_response(&response)
    }

    /// Send a response to the client
    fn send_response(&mut self, response: &Response) -> Result<()> {
        write_response(&mut self.writer, response)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Current protocol state
    pub fn state(&self) -> &SessionState {
        &self.state
    }
}

/// Execute a command and build its response
///
/// The elapsed time is checked against `op_timeout` afterwards. Going over
/// turns the reply into an error, but whatever the command changed stays
/// persisted.
pub fn dispatch(db: &Database, command: &Command, op_timeout: Duration) -> Response {
    let started = Instant::now();
    let result = db.execute(command);
    let elapsed = started.elapsed();

    if elapsed > op_timeout {
        tracing::warn!(
            "{} on {}.{} took {:?} (deadline {:?})",
            command.command_type(),
            db.name(),
            command.collection(),
            elapsed,
            op_timeout
        );
        let completion = match &result {
            Ok(_) => "the operation still completed".to_string(),
            Err(e) => format!("the operation failed: {}", e),
        };
        return Response::error(format!(
            "{} operation timed out after {} ms (limit {} ms); {}",
            command.command_type(),
            elapsed.as_millis(),
            op_timeout.as_millis(),
            completion
        ));
    }

    match result {
        Ok(outcome) => outcome_response(outcome),
        Err(e) => Response::error(e.to_string()),
    }
}

fn outcome_response(outcome: Outcome) -> Response {
    match outcome {
        Outcome::Inserted(document) => Response::success(
            format!("Document inserted successfully (_id: {})", document.id()),
            1,
        ),
        Outcome::Found(documents) => {
            Response::found(documents.into_iter().map(|d| d.into_value()).collect())
        }
        Outcome::Deleted(count) => Response::success(format!("Deleted {} document(s)", count), count),
    }
}
