#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, DatabaseFairing};
use crate::logging::LoggerFairing;

pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod model;

pub use config::Config;

/// Assemble the server: logging, configuration, database, routes.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .mount("/", api::routes())
        .register("/", api::catchers())
}

/// Connect to the database configured for tests.
#[cfg(test)]
async fn db_client() -> mongodb::Client {
    let db_uri = rocket::Config::figment()
        .extract_inner::<String>("db_uri")
        .expect("`db_uri` not set");
    mongodb::Client::with_uri_str(&db_uri)
        .await
        .unwrap_or_else(|e| panic!("Could not connect to database at \"{db_uri}\": {e}"))
}

/// Use a random database name to avoid collisions between tests.
#[cfg(test)]
fn database() -> String {
    let random: u32 = rand::random();
    format!("test{random}")
}

/// The server as [`build`] assembles it, but on the given test database.
#[cfg(test)]
async fn rocket_for_db(client: mongodb::Client, db_name: &str) -> Rocket<Build> {
    let db = client.database(db_name);
    model::mongodb::ensure_indexes_exist(&db)
        .await
        .expect("Failed to create indexes");

    rocket::build()
        .attach(ConfigFairing)
        .mount("/", api::routes())
        .register("/", api::catchers())
        .manage(client)
        .manage(db)
}

/// Insert the example admin and log the client in as them.
#[cfg(test)]
async fn login_example_admin(client: &rocket::local::asynchronous::Client, db: &mongodb::Database) {
    use model::{
        api::credentials::Credentials,
        db::Admin,
        mongodb::{Coll, Counter},
    };

    let counters = Coll::<Counter>::from_db(db);
    let admin = Admin {
        id: Counter::next_id::<Admin>(&counters).await.unwrap(),
        ..Admin::example()
    };
    Coll::<Admin>::from_db(db)
        .insert_one(admin, None)
        .await
        .unwrap();

    let response = client
        .post(uri!(api::auth::authenticate))
        .header(rocket::http::ContentType::JSON)
        .body(rocket::serde::json::json!(Credentials::admin_example()).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), rocket::http::Status::Ok);
}

/// Register the example voter and log the client in as them.
#[cfg(test)]
async fn login_example_voter(client: &rocket::local::asynchronous::Client, db: &mongodb::Database) {
    use model::{
        api::credentials::Credentials,
        db::Voter,
        mongodb::{Coll, Counter},
    };

    let counters = Coll::<Counter>::from_db(db);
    let voter = Voter {
        id: Counter::next_id::<Voter>(&counters).await.unwrap(),
        ..Voter::example()
    };
    Coll::<Voter>::from_db(db)
        .insert_one(voter, None)
        .await
        .unwrap();

    let response = client
        .post(uri!(api::auth::login))
        .header(rocket::http::ContentType::JSON)
        .body(rocket::serde::json::json!(Credentials::example()).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), rocket::http::Status::Ok);
}
