//! Response definitions
//!
//! Represents responses to clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: Status,

    /// Human-readable outcome or error description
    pub message: String,

    /// Documents (FIND only; empty otherwise)
    #[serde(default)]
    pub data: Vec<Value>,

    /// Documents found, inserted or deleted
    #[serde(default)]
    pub count: usize,
}

impl Response {
    /// A success response without documents
    pub fn success(message: impl Into<String>, count: usize) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: Vec::new(),
            count,
        }
    }

    /// A success response carrying documents
    pub fn found(data: Vec<Value>) -> Self {
        let count = data.len();
        Self {
            status: Status::Success,
            message: format!("Found {} documents", count),
            data,
            count,
        }
    }

    /// Create an ERROR response
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            data: Vec::new(),
            count: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }
}
