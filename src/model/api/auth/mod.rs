mod access;
mod token;
mod user;

pub use access::{AdminAccess, ACCESS_DENIED};
pub use token::{AuthToken, AUTH_TOKEN_COOKIE};
pub use user::{Rights, User};
