//! DB-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are serialised in an DB-friendly way, e.g.:
//!
//! - IDs are stored as `_id`.
//! - Datetimes are serialised in MongoDB's own format.

mod account;
pub use account::Account;

pub mod admin;
pub use admin::Admin;

mod ballot_pen;
pub use ballot_pen::BallotPen;

mod candidate;
pub use candidate::Candidate;

mod candidate_list;
pub use candidate_list::CandidateList;

mod elector;
pub use elector::Elector;

mod voter;
pub use voter::Voter;
