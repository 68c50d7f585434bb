use rocket::http::Status;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    common::{CandidateId, ListId},
    db::CandidateList,
};

/// A candidate running on exactly one list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: CandidateId,
    pub name: String,
    pub party: String,
    #[serde(default)]
    pub votes: u32,
    pub list_id: ListId,
}

impl Candidate {
    /// A fresh candidate with no votes.
    pub fn new(id: CandidateId, name: String, party: String, list_id: ListId) -> Self {
        Self {
            id,
            name,
            party,
            votes: 0,
            list_id,
        }
    }

    /// A vote for this candidate may only be counted against its own list.
    pub fn ensure_belongs_to(&self, list: &CandidateList) -> Result<()> {
        if self.list_id != list.id {
            return Err(Error::Status(
                Status::BadRequest,
                "Candidate does not belong to selected list".to_string(),
            ));
        }
        Ok(())
    }

    /// A candidate can never hold more votes than its whole list.
    pub fn ensure_within_list_total(&self, list: &CandidateList) -> Result<()> {
        if self.votes > list.list_votes {
            return Err(Error::Status(
                Status::BadRequest,
                "Invalid vote count".to_string(),
            ));
        }
        Ok(())
    }
}
