//! Network Module
//!
//! TCP server, per-client sessions, and a blocking client.
//!
//! ## Architecture
//! - Single acceptor thread (non-blocking accept, polls a shutdown flag)
//! - One thread per connection running a [`Connection`] session
//! - Sessions share one [`DatabaseRegistry`](crate::database::DatabaseRegistry)

mod client;
mod connection;
mod server;

pub use client::Client;
pub use connection::{dispatch, Connection, SessionState};
pub use server::Server;
