use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::model::db::{Admin, Voter};

/// A user of our application, having defined rights.
pub trait User {
    /// The rights of this user type.
    const RIGHTS: Rights;
    /// Get the user's ID.
    fn id(&self) -> u32;
}

/// Different privilege levels.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Rights {
    Voter = 0,
    Admin = 1,
}

impl User for Voter {
    const RIGHTS: Rights = Rights::Voter;

    fn id(&self) -> u32 {
        self.id
    }
}

impl User for Admin {
    const RIGHTS: Rights = Rights::Admin;

    fn id(&self) -> u32 {
        self.id
    }
}
