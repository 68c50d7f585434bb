use serde::{Deserialize, Serialize};

/// Login credentials as stored in the database: never the plaintext password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub password_hash: String,
}

impl Account {
    /// Check whether the given password is correct.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> bool {
        match argon2::verify_encoded(&self.password_hash, password.as_ref()) {
            Ok(valid) => valid,
            Err(e) => {
                warn!("Malformed password hash for {}: {e}", self.username);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::api::credentials::Credentials;

    use super::*;

    #[test]
    fn verify_password() {
        let account: Account = Credentials::example().try_into().unwrap();
        assert_eq!(account.username, Credentials::example().username);
        assert_ne!(account.password_hash, Credentials::example().password);
        assert!(account.verify_password(&Credentials::example().password));
        assert!(!account.verify_password("wrong password"));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        let account = Account {
            username: "polling-station-4".to_string(),
            password_hash: "not-a-hash".to_string(),
        };
        assert!(!account.verify_password("not-a-hash"));
    }
}
