//! Persistence layer for the gig server.
//!
//! Provides SQLite-backed storage for campus locations and bookings.

pub mod bookings;
pub mod db;
pub mod locations;

pub use db::{init_database, is_storable, Database};
