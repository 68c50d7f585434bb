use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::model::{common::VoterId, db::Account};

/// A registered voter from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voter {
    #[serde(rename = "_id")]
    pub id: VoterId,
    #[serde(flatten)]
    pub account: Account,
}

impl Deref for Voter {
    type Target = Account;

    fn deref(&self) -> &Self::Target {
        &self.account
    }
}
