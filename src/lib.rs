//! # NestDB
//!
//! A small document store reached over a line-based TCP protocol:
//! - JSON documents grouped into collections, collections into databases
//! - Filter language with `$eq`, `$gt`, `$lt`, `$like`, `$in` and `$or`
//! - One JSON file per collection, replaced atomically on every write
//! - One thread per client session
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │            (one session thread per client)                   │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ database name
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 Database Registry                            │
//! │         (one shared Database per name)                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ INSERT / FIND / DELETE
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Database                                 │
//! │     (single writer / multi reader per database)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Query     │          │   Storage   │
//!   │ (evaluator) │          │ (JSON file) │
//!   └─────────────┘          └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod query;
pub mod document;
pub mod storage;
pub mod database;
pub mod network;
pub mod protocol;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{NestError, Result};
pub use config::Config;
pub use database::{Database, DatabaseRegistry, Outcome};
pub use document::Document;
pub use network::{Client, Server};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of NestDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
