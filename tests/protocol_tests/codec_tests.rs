//! Tests for the protocol codec
//!
//! These tests verify:
//! - Command line parsing (verbs, collections, JSON arguments)
//! - Handshake and line framing
//! - Response encoding and decoding

use std::io::Cursor;

use nestdb::error::NestError;
use nestdb::protocol::{
    decode_response, encode_response, parse_request, read_handshake, read_line, write_command,
    Command, CommandType, Request, Response, Status,
};
use serde_json::json;

// =============================================================================
// Command Parsing Tests
// =============================================================================

#[test]
fn test_parse_insert() {
    let request = parse_request(r#"INSERT users {"name": "Alice", "age": 25}"#).unwrap();
    assert_eq!(
        request,
        Request::Command(Command::Insert {
            collection: "users".to_string(),
            document: json!({"name": "Alice", "age": 25}),
        })
    );
}

#[test]
fn test_parse_find_and_delete() {
    let find = parse_request(r#"FIND users {"age": {"$gt": 26}}"#).unwrap();
    assert_eq!(
        find,
        Request::Command(Command::Find {
            collection: "users".to_string(),
            filter: json!({"age": {"$gt": 26}}),
        })
    );

    let delete = parse_request(r#"DELETE users {"name": "Alice"}"#).unwrap();
    assert_eq!(
        delete,
        Request::Command(Command::Delete {
            collection: "users".to_string(),
            filter: json!({"name": "Alice"}),
        })
    );
}

#[test]
fn test_parse_verbs_ignore_case() {
    let request = parse_request("find users {}").unwrap();
    match request {
        Request::Command(cmd) => assert_eq!(cmd.command_type(), CommandType::Find),
        other => panic!("expected a command, got {:?}", other),
    }
}

#[test]
fn test_parse_strips_single_quotes() {
    let request = parse_request(r#"INSERT users '{"name": "Bob"}'"#).unwrap();
    assert_eq!(
        request,
        Request::Command(Command::Insert {
            collection: "users".to_string(),
            document: json!({"name": "Bob"}),
        })
    );
}

#[test]
fn test_parse_exit() {
    assert_eq!(parse_request("EXIT").unwrap(), Request::Exit);
    assert_eq!(parse_request("  EXIT  ").unwrap(), Request::Exit);
}

#[test]
fn test_parse_unknown_operation() {
    let err = parse_request("UPDATE users {}").unwrap_err();
    assert!(matches!(err, NestError::UnknownOperation(ref op) if op == "UPDATE"));
    assert_eq!(err.to_string(), "Unknown operation: UPDATE");
}

#[test]
fn test_parse_errors() {
    assert!(matches!(parse_request("FIND"), Err(NestError::Parse(_))));
    assert!(matches!(parse_request("INSERT users"), Err(NestError::Parse(_))));
    assert!(matches!(parse_request("DELETE users"), Err(NestError::Parse(_))));
    assert!(matches!(
        parse_request("INSERT users {name: Alice}"),
        Err(NestError::Parse(_))
    ));
}

#[test]
fn test_command_display_round_trips() {
    let command = Command::Find {
        collection: "users".to_string(),
        filter: json!({"email": {"$like": "%gmail.com"}}),
    };
    let mut out = Vec::new();
    write_command(&mut out, &command).unwrap();

    let line = String::from_utf8(out).unwrap();
    assert!(line.ends_with('\n'));
    assert_eq!(parse_request(line.trim_end()).unwrap(), Request::Command(command));
}

// =============================================================================
// Framing Tests
// =============================================================================

#[test]
fn test_handshake_with_newline() {
    let mut reader = Cursor::new(b"shop\nFIND items {}\n".to_vec());
    assert_eq!(read_handshake(&mut reader, 64).unwrap().as_deref(), Some("shop"));
    assert_eq!(read_line(&mut reader, 64).unwrap().as_deref(), Some("FIND items {}"));
}

#[test]
fn test_handshake_without_newline() {
    let mut reader = Cursor::new(b"shop".to_vec());
    assert_eq!(read_handshake(&mut reader, 64).unwrap().as_deref(), Some("shop"));
    assert_eq!(read_line(&mut reader, 64).unwrap(), None);
}

#[test]
fn test_handshake_eof() {
    let mut reader = Cursor::new(Vec::new());
    assert_eq!(read_handshake(&mut reader, 64).unwrap(), None);
}

#[test]
fn test_oversized_line_is_protocol_error() {
    let mut reader = Cursor::new(vec![b'a'; 100]);
    assert!(matches!(read_line(&mut reader, 10), Err(NestError::Protocol(_))));
}

#[test]
fn test_line_at_limit_is_accepted() {
    let mut reader = Cursor::new(b"0123456789\n".to_vec());
    assert_eq!(read_line(&mut reader, 10).unwrap().as_deref(), Some("0123456789"));
}

#[test]
fn test_invalid_utf8_is_parse_error() {
    let mut reader = Cursor::new(vec![0xff, 0xfe, b'\n']);
    assert!(matches!(read_line(&mut reader, 10), Err(NestError::Parse(_))));
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_encode_success_response() {
    let line = encode_response(&Response::success("Deleted 2 document(s)", 2)).unwrap();
    assert!(line.ends_with('\n'));
    assert_eq!(line.matches('\n').count(), 1);

    let value: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(value["status"], "success");
    assert_eq!(value["count"], 2);
    assert_eq!(value["data"], json!([]));
}

#[test]
fn test_found_response_carries_documents() {
    let response = Response::found(vec![json!({"_id": "a"}), json!({"_id": "b"})]);
    assert_eq!(response.count, 2);
    assert_eq!(response.message, "Found 2 documents");

    let decoded = decode_response(&encode_response(&response).unwrap()).unwrap();
    assert_eq!(decoded, response);
}

#[test]
fn test_decode_error_without_optional_fields() {
    let decoded = decode_response(r#"{"status":"error","message":"Unknown operation: X"}"#).unwrap();
    assert_eq!(decoded.status, Status::Error);
    assert!(decoded.data.is_empty());
    assert_eq!(decoded.count, 0);
}

#[test]
fn test_decode_malformed_response() {
    assert!(matches!(decode_response("Connected to database: x"), Err(NestError::Protocol(_))));
}
