//! Storage Module
//!
//! One JSON file per collection, rewritten whole on every mutation.
//!
//! ## Responsibilities
//! - Load a collection snapshot (missing file = empty collection)
//! - Apply insert / remove in memory and persist the full new snapshot
//! - Never leave a half-written file where the next load would read it
//!
//! ## File Format
//! ```text
//! {data_dir}/{database}/{collection}.json
//!
//! {
//!   "<_id>": { "_id": "<_id>", ...fields },
//!   ...
//! }
//! ```
//! Keys appear in insertion order; finds return documents in that order.
//!
//! ## Durability
//! Snapshots are written to a temp file in the same directory, fsynced, and
//! renamed over the old file. A crash leaves either the old or the new
//! snapshot, never a mix.

mod collection;
mod snapshot;

pub use collection::{Collection, CollectionStore};
pub use snapshot::{read_snapshot, write_snapshot};
