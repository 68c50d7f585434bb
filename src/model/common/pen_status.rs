use mongodb::bson::{to_bson, Bson};
use serde::{Deserialize, Serialize};

/// States in the ballot pen lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenStatus {
    /// In stock, not handed to anyone.
    Available,
    /// Assigned to a voter.
    InUse,
}

impl From<PenStatus> for Bson {
    fn from(status: PenStatus) -> Self {
        to_bson(&status).expect("Serialisation is infallible")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_as_snake_case() {
        assert_eq!(Bson::from(PenStatus::Available), Bson::from("available"));
        assert_eq!(Bson::from(PenStatus::InUse), Bson::from("in_use"));
    }
}
