//! Protocol Module
//!
//! Defines the line-based text protocol between clients and the server.
//!
//! ## Session Flow
//! ```text
//! client                                   server
//!   │  <database name>[\n]                   │
//!   │ ─────────────────────────────────────► │
//!   │          Connected to database: <name>\n│
//!   │ ◄───────────────────────────────────── │
//!   │  INSERT users {"name":"Alice"}\n       │
//!   │ ─────────────────────────────────────► │
//!   │  {"status":"success",...}\n            │
//!   │ ◄───────────────────────────────────── │
//!   │  EXIT\n                                │
//!   │ ─────────────────────────────────────► │
//!   │             Disconnected from database\n│
//!   │ ◄───────────────────────────────────── │
//! ```
//!
//! ### Commands
//! - `INSERT <collection> <document>`
//! - `FIND <collection> [<filter>]`   (no filter = `{}`)
//! - `DELETE <collection> <filter>`
//! - `EXIT`
//!
//! The JSON argument may be wrapped in single quotes, which are stripped.
//!
//! ### Response
//! ```text
//! {"status":"success"|"error","message":"...","data":[...],"count":N}
//! ```

mod codec;
mod command;
mod response;

pub use codec::{
    decode_response, encode_response, parse_request, read_handshake, read_line,
    write_command, write_response, write_text_line, GOODBYE, WELCOME_PREFIX,
};
pub use command::{Command, CommandType, Request, EXIT};
pub use response::{Response, Status};
