use std::net::IpAddr;
use std::path::{Path, PathBuf};

use chrono::Duration;
use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    tokio::fs,
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::{
    db::admin::ensure_admin_exists,
    mongodb::{ensure_indexes_exist, Coll},
};

/// Default registration capacity.
pub const MAX_VOTERS: u64 = 361;

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    auth_ttl: u32,
    export_dir: PathBuf,
    admin_origins: Vec<IpAddr>,
    #[serde(default = "default_max_voters")]
    max_voters: u64,
    // secrets
    jwt_secret: String,
}

fn default_max_voters() -> u64 {
    MAX_VOTERS
}

impl Config {
    /// Valid lifetime of auth token cookies in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Directory receiving the per-voter elector snapshots.
    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Maximum number of registered voters.
    pub fn max_voters(&self) -> u64 {
        self.max_voters
    }

    /// Secret key used to sign JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Whether a request from `ip` may reach the admin routes.
    /// An empty allow-list admits every origin; an unknown origin is never admitted otherwise.
    pub fn is_admin_origin(&self, ip: Option<IpAddr>) -> bool {
        if self.admin_origins.is_empty() {
            return true;
        }
        match ip {
            Some(ip) => self.admin_origins.iter().any(|allowed| {
                *allowed == ip || allowed.to_canonical() == ip.to_canonical()
            }),
            None => false,
        }
    }
}

/// A fairing that loads the application config, makes sure the export
/// directory exists, and puts the config in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        if let Err(e) = fs::create_dir_all(config.export_dir()).await {
            error!(
                "Failed to create export directory {}: {e}",
                config.export_dir().display()
            );
            return Err(rocket);
        }

        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // secrets
    db_uri: String,
    default_admin_password: String,
}

/// A fairing that loads the MongoDB config, connects to the database,
/// performs any setup necessary, and places both a `Client` and a `Database`
/// into managed state.
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");
        let client = match MongoClient::with_uri_str(config.db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db = client.database(DATABASE);

        if let Err(e) = ensure_indexes_exist(&db).await {
            error!("Failed to create database indexes: {e}");
            return Err(rocket);
        }

        // Ensure there is at least one admin able to configure the election.
        let admins = Coll::from_db(&db);
        let counters = Coll::from_db(&db);
        if let Err(e) =
            ensure_admin_exists(&admins, &counters, &config.default_admin_password).await
        {
            error!("Failed to set up default admin: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        rocket = rocket.manage(client).manage(db);
        Ok(rocket)
    }
}

/// Name of the production database.
const DATABASE: &str = "electors";

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl Config {
        pub fn example() -> Self {
            Self {
                auth_ttl: 600,
                export_dir: std::env::temp_dir().join("electors-test-exports"),
                admin_origins: vec!["127.0.0.1".parse().unwrap()],
                max_voters: MAX_VOTERS,
                jwt_secret: "test-secret".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_origin_allow_list() {
        let config = Config::example();
        assert!(config.is_admin_origin(Some("127.0.0.1".parse().unwrap())));
        assert!(config.is_admin_origin(Some("::ffff:127.0.0.1".parse().unwrap())));
        assert!(!config.is_admin_origin(Some("10.0.0.7".parse().unwrap())));
        assert!(!config.is_admin_origin(None));
    }

    #[test]
    fn empty_allow_list_admits_everyone() {
        let config = Config {
            admin_origins: Vec::new(),
            ..Config::example()
        };
        assert!(config.is_admin_origin(Some("10.0.0.7".parse().unwrap())));
        assert!(config.is_admin_origin(None));
    }
}
