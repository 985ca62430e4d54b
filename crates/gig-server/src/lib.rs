//! Shared library surface for the gig server and its tests.

pub mod api;
pub mod config;
pub mod intake;
pub mod persistence;
pub mod state;
