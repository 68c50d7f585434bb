use serde::{Deserialize, Serialize};

use crate::model::common::ListId;

/// A named electoral list with its running vote total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateList {
    #[serde(rename = "_id")]
    pub id: ListId,
    pub name: String,
    #[serde(default)]
    pub list_votes: u32,
}

impl CandidateList {
    /// A fresh list with no votes.
    pub fn new(id: ListId, name: String) -> Self {
        Self {
            id,
            name,
            list_votes: 0,
        }
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl CandidateList {
        pub fn example() -> Self {
            Self::new(1, "Unity List".to_string())
        }

        pub fn example2() -> Self {
            Self::new(2, "Reform Bloc".to_string())
        }
    }
}
