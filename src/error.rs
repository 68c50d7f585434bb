use argon2::Error as Argon2Error;
use jsonwebtoken::errors::Error as JwtError;
use mongodb::error::Error as DbError;
use rocket::{
    http::{Status, StatusClass},
    response::{self, status::Custom, Responder},
    Request,
};
use rust_xlsxwriter::XlsxError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Argon2(#[from] Argon2Error),
    #[error("Failed to build spreadsheet: {0}")]
    Spreadsheet(#[from] XlsxError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{1}")]
    Status(Status, String),
}

impl Error {
    pub fn not_found(what: String) -> Self {
        Self::Status(Status::NotFound, format!("{what} not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Status(Status::BadRequest, message.into())
    }

    pub fn status(&self) -> Status {
        match self {
            Self::Status(status, _) => *status,
            Self::Jwt(_) => Status::Unauthorized,
            Self::Db(_) | Self::Argon2(_) | Self::Spreadsheet(_) | Self::Io(_) => {
                Status::InternalServerError
            }
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        // Internal details stay in the log.
        let body = match self {
            Self::Status(_, message) => message,
            other => {
                error!("{other}");
                status.reason_lossy().to_string()
            }
        };
        if status.class() == StatusClass::ClientError {
            debug!("Rejected request: {body}");
        }
        Custom(status, body).respond_to(req)
    }
}
