use argon2::Config;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::db::Account;

/// Raw credentials, received from a user. These are never stored directly,
/// since the password is in plaintext.
#[derive(Clone, Deserialize, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl TryFrom<Credentials> for Account {
    type Error = Error;

    /// Convert [`Credentials`] to an [`Account`] by hashing the password.
    /// Both the username and the password must be non-empty.
    fn try_from(cred: Credentials) -> Result<Self, Self::Error> {
        if cred.username.trim().is_empty() || cred.password.is_empty() {
            return Err(Error::bad_request("Username and password are required."));
        }

        // 16 bytes is recommended for password hashing:
        //  https://en.wikipedia.org/wiki/Argon2
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        let password_hash =
            argon2::hash_encoded(cred.password.as_bytes(), &salt, &Config::default())?;
        Ok(Self {
            username: cred.username,
            password_hash,
        })
    }
}

#[cfg(test)]
mod examples {
    use super::*;

    impl Credentials {
        pub fn example() -> Self {
            Self {
                username: "station-12".into(),
                password: "ballots4all".into(),
            }
        }

        pub fn example2() -> Self {
            Self {
                username: "station-31".into(),
                password: "countevery1".into(),
            }
        }

        pub fn admin_example() -> Self {
            Self {
                username: "coordinator".into(),
                password: "totallysecurepassword".into(),
            }
        }

        pub fn empty() -> Self {
            Self {
                username: "".into(),
                password: "".into(),
            }
        }
    }
}
