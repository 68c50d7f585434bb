use serde::{Deserialize, Serialize};

use crate::model::common::{CandidateId, ListId};

/// A single vote for a candidate within a list.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct VoteRequest {
    pub list_id: ListId,
    pub candidate_id: CandidateId,
}

/// The tallies after a vote has been counted.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct VoteReceipt {
    pub list_id: ListId,
    pub list_votes: u32,
    pub candidate_id: CandidateId,
    pub candidate_votes: u32,
}
