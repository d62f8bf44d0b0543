//! Data types for candidates and the peer entities they reference.
//!
//! - [`candidate`] holds the stored entity, serialised in a DB-friendly way.
//! - [`api`] holds the request and response shapes exchanged over HTTP.
//! - [`mongodb`] holds collection plumbing shared by the MongoDB store.

pub mod api;
pub mod candidate;
pub mod mongodb;
