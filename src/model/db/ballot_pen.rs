use serde::{Deserialize, Serialize};

use crate::model::common::{PenId, PenStatus, VoterId};

/// A physical ballot pen, tracked for inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotPen {
    #[serde(rename = "_id")]
    pub id: PenId,
    pub serial_number: String,
    pub status: PenStatus,
    pub user_id: Option<VoterId>,
}

impl BallotPen {
    /// A new pen is available, even when it is recorded with an owner.
    /// Only an explicit assignment puts it in use.
    pub fn new(id: PenId, serial_number: String, owner: Option<VoterId>) -> Self {
        Self {
            id,
            serial_number,
            status: PenStatus::Available,
            user_id: owner,
        }
    }

    /// Hand the pen to a voter. Any previous owner is replaced.
    pub fn assign(&mut self, owner: VoterId) {
        self.user_id = Some(owner);
        self.status = PenStatus::InUse;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pens_are_available() {
        let pen = BallotPen::new(1, "BP-0001".to_string(), None);
        assert_eq!(pen.status, PenStatus::Available);
        assert_eq!(pen.user_id, None);

        let mut pen = BallotPen::new(2, "BP-0002".to_string(), Some(9));
        assert_eq!(pen.status, PenStatus::Available);
        assert_eq!(pen.user_id, Some(9));

        pen.assign(9);
        assert_eq!(pen.status, PenStatus::InUse);
    }

    #[test]
    fn reassignment_overwrites_owner() {
        let mut pen = BallotPen::new(1, "BP-0001".to_string(), None);
        pen.assign(4);
        assert_eq!((pen.user_id, pen.status), (Some(4), PenStatus::InUse));
        pen.assign(5);
        assert_eq!((pen.user_id, pen.status), (Some(5), PenStatus::InUse));
    }
}
