//! Protocol codec
//!
//! Framing, parsing and encoding for the text protocol.
//!
//! ## Framing
//! - Handshake: the database name, either newline-terminated or as the
//!   whole of the first receive buffer
//! - Commands: one per `\n`-terminated line (`\r\n` accepted)
//! - Responses: one JSON object per line; welcome/goodbye are plain text lines

use std::io::{BufRead, Read, Write};

use serde_json::{Map, Value};

use super::{Command, CommandType, Request, Response, EXIT};
use crate::error::{NestError, Result};

/// Prefix of the line sent after a successful handshake
pub const WELCOME_PREFIX: &str = "Connected to database: ";

/// Line sent in reply to `EXIT`
pub const GOODBYE: &str = "Disconnected from database";

// =============================================================================
// Reading
// =============================================================================

/// Read the handshake message (database name)
///
/// If the first receive buffer holds a newline, the name is the first line;
/// otherwise the whole buffer is the name. Returns `Ok(None)` on EOF.
pub fn read_handshake<R: BufRead>(reader: &mut R, max_bytes: usize) -> Result<Option<String>> {
    let available = reader.fill_buf()?;
    if available.is_empty() {
        return Ok(None);
    }
    if available.contains(&b'\n') {
        return read_line(reader, max_bytes);
    }

    if available.len() > max_bytes {
        return Err(NestError::Protocol(format!(
            "message exceeds {} bytes",
            max_bytes
        )));
    }
    let bytes = available.to_vec();
    reader.consume(bytes.len());

    let text = decode_utf8(bytes)?;
    Ok(Some(trim_line_ending(text)))
}

/// Read one `\n`-terminated line, without its line ending
///
/// Returns `Ok(None)` on EOF. A final line without `\n` is still returned.
/// Lines longer than `max_bytes` are a `Protocol` error (the stream is no
/// longer in sync, so the session must end).
pub fn read_line<R: BufRead>(reader: &mut R, max_bytes: usize) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let read = reader
        .by_ref()
        .take(max_bytes as u64 + 1)
        .read_until(b'\n', &mut buf)?;

    if read == 0 {
        return Ok(None);
    }
    if buf.last() != Some(&b'\n') && buf.len() > max_bytes {
        return Err(NestError::Protocol(format!(
            "message exceeds {} bytes",
            max_bytes
        )));
    }

    let text = decode_utf8(buf)?;
    Ok(Some(trim_line_ending(text)))
}

fn decode_utf8(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|_| NestError::Parse("message is not valid UTF-8".to_string()))
}

fn trim_line_ending(mut text: String) -> String {
    while text.ends_with('\n') || text.ends_with('\r') {
        text.pop();
    }
    text
}

// =============================================================================
// Command Parsing
// =============================================================================

/// Parse one command line: `OPERATION COLLECTION REST` or `EXIT`
pub fn parse_request(line: &str) -> Result<Request> {
    let line = line.trim();
    if line == EXIT {
        return Ok(Request::Exit);
    }

    let (verb, rest) = split_token(line);
    let command_type = CommandType::parse(verb)
        .ok_or_else(|| NestError::UnknownOperation(verb.to_string()))?;

    let (collection, argument) = split_token(rest);
    if collection.is_empty() {
        return Err(NestError::Parse(format!(
            "{} requires a collection name",
            command_type
        )));
    }
    let collection = collection.to_string();
    let argument = strip_quotes(argument.trim());

    let command = match command_type {
        CommandType::Insert => Command::Insert {
            collection,
            document: parse_json(command_type, argument, "a JSON document")?,
        },
        CommandType::Find => Command::Find {
            collection,
            filter: if argument.is_empty() {
                Value::Object(Map::new())
            } else {
                parse_json(command_type, argument, "a JSON filter")?
            },
        },
        CommandType::Delete => Command::Delete {
            collection,
            filter: parse_json(command_type, argument, "a JSON filter")?,
        },
    };

    Ok(Request::Command(command))
}

/// Split off the first whitespace-delimited token
fn split_token(text: &str) -> (&str, &str) {
    match text.find(char::is_whitespace) {
        Some(pos) => (&text[..pos], text[pos..].trim_start()),
        None => (text, ""),
    }
}

/// `'{"a": 1}'` → `{"a": 1}`
fn strip_quotes(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('\'') && text.ends_with('\'') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

fn parse_json(command_type: CommandType, text: &str, what: &str) -> Result<Value> {
    if text.is_empty() {
        return Err(NestError::Parse(format!("{} requires {}", command_type, what)));
    }
    serde_json::from_str(text).map_err(|e| NestError::Parse(format!("invalid JSON: {}", e)))
}

// =============================================================================
// Writing
// =============================================================================

/// Encode a response as a single JSON line
pub fn encode_response(response: &Response) -> Result<String> {
    let mut line = serde_json::to_string(response)?;
    line.push('\n');
    Ok(line)
}

/// Decode a response line
pub fn decode_response(line: &str) -> Result<Response> {
    serde_json::from_str(line.trim_end())
        .map_err(|e| NestError::Protocol(format!("malformed response: {}", e)))
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let line = encode_response(response)?;
    writer.write_all(line.as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Write a plain text line (welcome, goodbye, database name)
pub fn write_text_line<W: Write>(writer: &mut W, text: &str) -> Result<()> {
    writer.write_all(text.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Write a command line to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    write_text_line(writer, &command.to_string())
}
