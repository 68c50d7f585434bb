use serde::{Deserialize, Serialize};

use crate::model::{common::VoterId, db::Voter};

/// A voter as shown to admins: no password hash.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterDescription {
    pub id: VoterId,
    pub username: String,
}

impl From<Voter> for VoterDescription {
    fn from(voter: Voter) -> Self {
        Self {
            id: voter.id,
            username: voter.account.username,
        }
    }
}
