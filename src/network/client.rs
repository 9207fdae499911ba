//! Blocking client
//!
//! Speaks the line protocol over one TCP connection.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde_json::Value;

use crate::error::{NestError, Result};
use crate::protocol::{
    decode_response, read_line, write_command, write_text_line, Command, Response, EXIT,
    WELCOME_PREFIX,
};

/// Replies longer than this are refused
const MAX_REPLY_BYTES: usize = 64 * 1024 * 1024;

/// A session bound to one database
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    welcome: String,
}

impl Client {
    /// Connect and perform the database-name handshake
    pub fn connect<A: ToSocketAddrs>(addr: A, database: &str, timeout: Duration) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| NestError::Network(format!("connection failed: {}", e)))?;
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;

        let mut client = Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
            welcome: String::new(),
        };

        write_text_line(&mut client.writer, database)?;
        let reply = client.read_reply_line()?;
        if !reply.starts_with(WELCOME_PREFIX) {
            let message = match decode_response(&reply) {
                Ok(response) => response.message,
                Err(_) => reply,
            };
            return Err(NestError::Network(format!("handshake rejected: {}", message)));
        }

        client.welcome = reply;
        Ok(client)
    }

    /// The server's welcome line
    pub fn welcome(&self) -> &str {
        &self.welcome
    }

    /// Send a raw command line and read the JSON reply
    pub fn send_line(&mut self, line: &str) -> Result<Response> {
        write_text_line(&mut self.writer, line)?;
        let reply = self.read_reply_line()?;
        decode_response(&reply)
    }

    pub fn execute(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        let reply = self.read_reply_line()?;
        decode_response(&reply)
    }

    pub fn insert(&mut self, collection: &str, document: Value) -> Result<Response> {
        self.execute(&Command::Insert {
            collection: collection.to_string(),
            document,
        })
    }

    pub fn find(&mut self, collection: &str, filter: Value) -> Result<Response> {
        self.execute(&Command::Find {
            collection: collection.to_string(),
            filter,
        })
    }

    pub fn delete(&mut self, collection: &str, filter: Value) -> Result<Response> {
        self.execute(&Command::Delete {
            collection: collection.to_string(),
            filter,
        })
    }

    /// End the session; returns the server's goodbye line
    pub fn exit(mut self) -> Result<String> {
        write_text_line(&mut self.writer, EXIT)?;
        self.read_reply_line()
    }

    fn read_reply_line(&mut self) -> Result<String> {
        match read_line(&mut self.reader, MAX_REPLY_BYTES) {
            Ok(Some(line)) => Ok(line),
            Ok(None) => Err(NestError::Network("server closed the connection".to_string())),
            Err(NestError::Io(e)) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                Err(NestError::Network("timed out waiting for the server".to_string()))
            }
            Err(e) => Err(e),
        }
    }
}
