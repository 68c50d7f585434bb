use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request, State,
};

use crate::config::Config;
use crate::error::Error;
use crate::model::db::Admin;

use super::token::AuthToken;

pub const ACCESS_DENIED: &str = "Access Denied";

/// Guard for the configuration routes: the request must come from an
/// administrative host *and* carry an admin session.
pub struct AdminAccess {
    pub token: AuthToken<Admin>,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminAccess {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        // Unwrap is safe as `Config` is always managed.
        let config = req.guard::<&State<Config>>().await.unwrap();

        if !config.is_admin_origin(req.client_ip()) {
            warn!(
                "Refused admin request from {}",
                req.client_ip()
                    .map(|ip| ip.to_string())
                    .unwrap_or_else(|| "unknown origin".to_string())
            );
            return Outcome::Error((
                Status::Forbidden,
                Error::Status(Status::Forbidden, ACCESS_DENIED.to_string()),
            ));
        }

        req.guard::<AuthToken<Admin>>()
            .await
            .map(|token| AdminAccess { token })
    }
}
