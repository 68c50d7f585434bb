use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    api::credentials::Credentials,
    common::AdminId,
    db::Account,
    mongodb::{Coll, Counter},
};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// An admin user from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: AdminId,
    #[serde(flatten)]
    pub account: Account,
}

impl Deref for Admin {
    type Target = Account;

    fn deref(&self) -> &Self::Target {
        &self.account
    }
}

/// Insert the default admin if there are no admins at all.
pub async fn ensure_admin_exists(
    admins: &Coll<Admin>,
    counters: &Coll<Counter>,
    password: &str,
) -> Result<()> {
    if admins.count_documents(None, None).await? > 0 {
        return Ok(());
    }

    let credentials = Credentials {
        username: DEFAULT_ADMIN_USERNAME.to_string(),
        password: password.to_string(),
    };
    let admin = Admin {
        id: Counter::next_id::<Admin>(counters).await?,
        account: credentials.try_into()?,
    };
    admins.insert_one(&admin, None).await?;
    warn!("Created default admin {DEFAULT_ADMIN_USERNAME}, change its password");
    Ok(())
}


#[cfg(test)]
mod tests {
    use mongodb::{bson::doc, Database};

    use super::*;

    #[backend_test]
    async fn default_admin_created_once(db: Database) {
        let admins = Coll::<Admin>::from_db(&db);
        let counters = Coll::<Counter>::from_db(&db);

        ensure_admin_exists(&admins, &counters, "hunter22")
            .await
            .unwrap();
        ensure_admin_exists(&admins, &counters, "other")
            .await
            .unwrap();

        assert_eq!(admins.count_documents(None, None).await.unwrap(), 1);
        let admin = admins
            .find_one(doc! { "username": DEFAULT_ADMIN_USERNAME }, None)
            .await
            .unwrap()
            .unwrap();
        assert!(admin.verify_password("hunter22"));
    }
}
