//! Command definitions
//!
//! Represents commands from clients.

use std::fmt;

use serde_json::Value;

/// Message that ends a session
pub const EXIT: &str = "EXIT";

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Insert,
    Find,
    Delete,
}

impl CommandType {
    /// Match a verb, ignoring ASCII case
    pub fn parse(verb: &str) -> Option<Self> {
        [CommandType::Insert, CommandType::Find, CommandType::Delete]
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(verb))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::Insert => "INSERT",
            CommandType::Find => "FIND",
            CommandType::Delete => "DELETE",
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Insert (or replace by `_id`) a document
    Insert { collection: String, document: Value },

    /// Find documents matching a filter
    Find { collection: String, filter: Value },

    /// Delete documents matching a filter
    Delete { collection: String, filter: Value },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Insert { .. } => CommandType::Insert,
            Command::Find { .. } => CommandType::Find,
            Command::Delete { .. } => CommandType::Delete,
        }
    }

    /// Target collection
    pub fn collection(&self) -> &str {
        match self {
            Command::Insert { collection, .. }
            | Command::Find { collection, .. }
            | Command::Delete { collection, .. } => collection,
        }
    }

    fn argument(&self) -> &Value {
        match self {
            Command::Insert { document, .. } => document,
            Command::Find { filter, .. } | Command::Delete { filter, .. } => filter,
        }
    }
}

/// Wire form: `VERB collection {json}`
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.command_type(),
            self.collection(),
            self.argument()
        )
    }
}

/// One message received in the `Ready` state
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Command(Command),
    Exit,
}
