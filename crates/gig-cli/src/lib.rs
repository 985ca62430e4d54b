//! Gig CLI - offline tools for the campus booking resolver.
//!
//! - `gigctl walking-time`: estimate between two coordinates
//! - `gigctl evaluate`: run the resolver over a JSON snapshot

pub mod snapshot;

pub use snapshot::{parse_coordinate, Snapshot, SnapshotVerdict};
