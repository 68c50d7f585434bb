//! API-compatible types.
//!
//! The types in this module are serialised in an API-friendly way, e.g.:
//!
//! - IDs are serialised as plain `id` fields.
//! - Password hashes are never exposed.

pub mod auth;
pub mod ballot;
pub mod ballot_pen;
pub mod candidate_list;
pub mod credentials;
pub mod elector;
pub mod results;
pub mod voter;
