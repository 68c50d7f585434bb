use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::model::common::{ElectorId, VoterId};

/// An attendance record submitted by a voter. The elector ID is supplied by
/// the caller and is unique across all records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Elector {
    #[serde(rename = "_id")]
    pub elector_id: ElectorId,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub submitted_at: DateTime<Utc>,
    pub voter_id: VoterId,
}

impl Elector {
    /// A record timestamped now, at the millisecond precision MongoDB stores.
    pub fn new(elector_id: ElectorId, voter_id: VoterId) -> Self {
        Self {
            elector_id,
            submitted_at: Utc::now().trunc_subsecs(3),
            voter_id,
        }
    }
}
