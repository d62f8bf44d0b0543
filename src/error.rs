use mongodb::error::Error as DbError;
use rocket::{
    http::{Status, StatusClass},
    response::Responder,
    serde::json::Json,
    Request,
};
use thiserror::Error;

use crate::model::api::GenericOutput;

pub type Result<T> = std::result::Result<T, Error>;

/// Message sent in place of database and internal failure details.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal error";

/// Every failure a candidate operation can report.
///
/// The `Display` text of each client-class variant is the message returned to
/// clients. Server-side failures are logged in full and reported as
/// [`INTERNAL_ERROR_MESSAGE`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid id")]
    InvalidId,
    #[error("Invalid name")]
    InvalidName,
    #[error("Invalid number")]
    InvalidNumber,
    #[error("Invalid party")]
    InvalidParty,
    #[error("Invalid election")]
    InvalidElection,
    #[error("Candidate number must start with the party number")]
    NumberPartyMismatch,
    #[error("Candidate number already in use for this election")]
    DuplicateCandidate,
    #[error("Candidate not found")]
    CandidateNotFound,
    #[error("Candidate already has votes")]
    VotesExist,
    #[error("Peer service unavailable: {0}")]
    UpstreamUnavailable(String),
    #[error("Database error: {0}")]
    Db(#[from] DbError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The HTTP status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            Self::InvalidId
            | Self::InvalidName
            | Self::InvalidNumber
            | Self::InvalidParty
            | Self::InvalidElection
            | Self::NumberPartyMismatch => Status::BadRequest,
            Self::DuplicateCandidate | Self::VotesExist => Status::Conflict,
            Self::CandidateNotFound => Status::NotFound,
            Self::UpstreamUnavailable(_) => Status::BadGateway,
            Self::Db(_) | Self::Internal(_) => Status::InternalServerError,
        }
    }

    /// The message returned to clients.
    pub fn client_message(&self) -> String {
        match self {
            Self::Db(_) | Self::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        match status.class() {
            StatusClass::ServerError => error!("{self}"),
            _ => debug!("{self}"),
        }
        (status, Json(GenericOutput::new(self.client_message()))).respond_to(req)
    }
}
