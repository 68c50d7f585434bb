use serde::{Deserialize, Serialize};

use crate::model::{
    api::candidate_list::{CandidateDescription, CandidateListDescription},
    common::ListId,
};

/// Results for one list: its candidates ranked by votes, highest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedList {
    pub list_id: ListId,
    pub list_name: String,
    /// Running total kept on the list itself.
    pub list_votes: u32,
    /// Sum of the candidates' votes.
    pub total_votes: u64,
    pub candidates: Vec<CandidateDescription>,
}

impl From<CandidateListDescription> for RankedList {
    fn from(list: CandidateListDescription) -> Self {
        let mut candidates = list.candidates;
        // Stable, so ties keep the store order.
        candidates.sort_by(|a, b| b.votes.cmp(&a.votes));
        Self {
            list_id: list.id,
            list_name: list.name,
            list_votes: list.list_votes,
            total_votes: candidates.iter().map(|c| u64::from(c.votes)).sum(),
            candidates,
        }
    }
}
