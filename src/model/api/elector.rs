use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{common::ElectorId, db::Elector};

/// An attendance entry submitted by the logged-in voter.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct ElectorSubmission {
    pub elector_id: ElectorId,
}

#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectorDescription {
    pub elector_id: ElectorId,
    pub submitted_at: DateTime<Utc>,
}

impl From<Elector> for ElectorDescription {
    fn from(elector: Elector) -> Self {
        Self {
            elector_id: elector.elector_id,
            submitted_at: elector.submitted_at,
        }
    }
}
