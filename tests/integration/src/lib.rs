//! Integration test utilities for the bump engine
//!
//! This crate provides in-memory fakes for every engine collaborator so the
//! coordination scenarios can run end-to-end without a database, a cache, or
//! a platform connection.

pub mod fixtures;

pub use fixtures::*;
