use mongodb::bson::doc;
use rocket::{
    http::{CookieJar, Status},
    serde::json::Json,
    Route, State,
};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            auth::{AuthToken, AUTH_TOKEN_COOKIE},
            credentials::Credentials,
        },
        db::{Admin, Voter},
        mongodb::Coll,
    },
    Config,
};

/// The same message for unknown users and wrong passwords.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub fn routes() -> Vec<Route> {
    routes![login, authenticate, logout]
}

#[post("/", data = "<credentials>", format = "json")]
pub async fn login(
    cookies: &CookieJar<'_>,
    credentials: Json<Credentials>,
    voters: Coll<Voter>,
    config: &State<Config>,
) -> Result<()> {
    let with_username = doc! {
        "username": &credentials.username,
    };

    let voter = voters
        .find_one(with_username, None)
        .await?
        .filter(|voter| voter.verify_password(&credentials.password))
        .ok_or_else(|| Error::Status(Status::Unauthorized, INVALID_CREDENTIALS.to_string()))?;

    cookies.add(AuthToken::new(&voter).into_cookie(config)?);
    info!("Voter {} logged in", voter.id);

    Ok(())
}

#[post("/auth/admin", data = "<credentials>", format = "json")]
pub async fn authenticate(
    cookies: &CookieJar<'_>,
    credentials: Json<Credentials>,
    admins: Coll<Admin>,
    config: &State<Config>,
) -> Result<()> {
    let with_username = doc! {
        "username": &credentials.username,
    };

    let admin = admins
        .find_one(with_username, None)
        .await?
        .filter(|admin| admin.verify_password(&credentials.password))
        .ok_or_else(|| Error::Status(Status::Unauthorized, INVALID_CREDENTIALS.to_string()))?;

    cookies.add(AuthToken::new(&admin).into_cookie(config)?);
    info!("Admin {} logged in", admin.username);

    Ok(())
}

#[get("/logout")]
pub fn logout(cookies: &CookieJar<'_>) -> Status {
    cookies.remove(AUTH_TOKEN_COOKIE);
    Status::Ok
}

#[cfg(test)]
mod tests {
    use mongodb::Database;
    use rocket::{
        http::ContentType, local::asynchronous::Client, serde::json::serde_json::json,
    };

    use crate::model::mongodb::{Coll, Counter};

    use super::*;

    async fn insert_voter(db: &Database) {
        let counters = Coll::<Counter>::from_db(db);
        let voter = Voter {
            id: Counter::next_id::<Voter>(&counters).await.unwrap(),
            ..Voter::example()
        };
        Coll::<Voter>::from_db(db)
            .insert_one(voter, None)
            .await
            .unwrap();
    }

    #[backend_test]
    async fn voter_login_valid(client: Client, db: Database) {
        insert_voter(&db).await;

        let response = client
            .post(uri!(login))
            .header(ContentType::JSON)
            .body(json!(Credentials::example()).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Ok, response.status());
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
    }

    #[backend_test]
    async fn voter_login_invalid(client: Client, db: Database) {
        insert_voter(&db).await;

        // Unknown username.
        let response = client
            .post(uri!(login))
            .header(ContentType::JSON)
            .body(json!(Credentials::example2()).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
        let unknown_user = response.into_string().await.unwrap();

        // Wrong password.
        let response = client
            .post(uri!(login))
            .header(ContentType::JSON)
            .body(
                json!({
                    "username": Credentials::example().username,
                    "password": "guess",
                })
                .to_string(),
            )
            .dispatch()
            .await;
        assert_eq!(Status::Unauthorized, response.status());
        let wrong_password = response.into_string().await.unwrap();

        // Indistinguishable.
        assert_eq!(unknown_user, INVALID_CREDENTIALS);
        assert_eq!(unknown_user, wrong_password);
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
    }

    #[backend_test]
    async fn voter_cannot_use_admin_login(client: Client, db: Database) {
        insert_voter(&db).await;

        let response = client
            .post(uri!(authenticate))
            .header(ContentType::JSON)
            .body(json!(Credentials::example()).to_string())
            .dispatch()
            .await;

        assert_eq!(Status::Unauthorized, response.status());
    }

    #[backend_test(admin)]
    async fn admin_login(client: Client) {
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());
    }

    #[backend_test(voter)]
    async fn logout_voter(client: Client) {
        assert!(client.cookies().get(AUTH_TOKEN_COOKIE).is_some());

        let response = client.get(uri!(logout)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
        assert_eq!(None, client.cookies().get(AUTH_TOKEN_COOKIE));
    }

    #[backend_test]
    async fn logout_not_logged_in(client: Client) {
        let response = client.get(uri!(logout)).dispatch().await;

        assert_eq!(Status::Ok, response.status());
    }
}
