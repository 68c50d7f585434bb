//! Types shared between the DB and API representations.

mod pen_status;
pub use pen_status::PenStatus;

pub type VoterId = u32;
pub type AdminId = u32;
pub type ListId = u32;
pub type CandidateId = u32;
pub type PenId = u32;
pub type ElectorId = u32;
