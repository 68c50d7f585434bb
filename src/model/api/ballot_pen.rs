use serde::{Deserialize, Serialize};

use crate::model::{
    common::{PenId, PenStatus, VoterId},
    db::BallotPen,
};

/// A new ballot pen, optionally handed to a voter straight away.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BallotPenSpec {
    pub serial_number: String,
    #[serde(default)]
    pub user_id: Option<VoterId>,
}

/// Hand an existing pen to a voter.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PenAssignment {
    pub user_id: VoterId,
    pub pen_id: PenId,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotPenDescription {
    pub id: PenId,
    pub serial_number: String,
    pub status: PenStatus,
    pub user_id: Option<VoterId>,
}

impl From<BallotPen> for BallotPenDescription {
    fn from(pen: BallotPen) -> Self {
        Self {
            id: pen.id,
            serial_number: pen.serial_number,
            status: pen.status,
            user_id: pen.user_id,
        }
    }
}
