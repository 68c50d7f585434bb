use rocket::{Catcher, Route};

use crate::model::api::auth::ACCESS_DENIED;

mod admin;
pub mod auth;
mod common;
mod electors;
mod results;
mod voter;
mod voting;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(auth::routes());
    routes.extend(admin::routes());
    routes.extend(voting::routes());
    routes.extend(results::routes());
    routes.extend(electors::routes());
    routes.extend(voter::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![unauthorized, forbidden, not_found]
}

/// Session routes reached without a valid auth token.
#[catch(401)]
fn unauthorized() -> &'static str {
    "Not logged in"
}

#[catch(403)]
fn forbidden() -> &'static str {
    ACCESS_DENIED
}

#[catch(404)]
fn not_found() -> &'static str {
    "Not found"
}

/// Peer address that the test configuration treats as the admin workstation.
#[cfg(test)]
pub(crate) fn admin_origin() -> std::net::SocketAddr {
    "127.0.0.1:8000".parse().unwrap()
}

#[cfg(test)]
mod tests {
    use rocket::{
        http::{ContentType, Status},
        local::asynchronous::Client,
    };

    #[backend_test(voter)]
    async fn unknown_paths_get_plain_text(client: Client) {
        for uri in ["/no-such-page", "/export-list"] {
            let response = client.get(uri).dispatch().await;
            assert_eq!(Status::NotFound, response.status());
            assert_eq!(response.content_type(), Some(ContentType::Plain));
            assert_eq!(response.into_string().await.unwrap(), "Not found");
        }
    }
}
