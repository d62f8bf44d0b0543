//! Clients for the peer services a candidate references.
//!
//! Each peer sits behind a trait so the service can be driven by the HTTP
//! clients in [`http`] or by the in-memory fakes in [`memory`].

use crate::error::Error;
use crate::model::{
    api::{ElectionOutput, PartyOutput},
    candidate::{CandidateId, ElectionId, PartyId},
};

pub mod http;
pub mod memory;

/// Ways a peer lookup can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("not found")]
    NotFound,
    #[error("request rejected with status {0}")]
    Rejected(u16),
    #[error("server error with status {0}")]
    ServerError(u16),
    #[error("{0}")]
    Unavailable(String),
}

impl LookupError {
    /// Whether trying the same request again might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// Convert into a service error, reporting an answer from the peer as
    /// `rejection` and a failure to get any answer as
    /// [`Error::UpstreamUnavailable`].
    pub fn into_error(self, peer: &str, rejection: Error) -> Error {
        match self {
            Self::Unavailable(reason) => Error::UpstreamUnavailable(format!("{peer}: {reason}")),
            other => {
                debug!("{peer} lookup failed: {other}");
                rejection
            }
        }
    }
}

#[rocket::async_trait]
pub trait ElectionLookup: Send + Sync {
    async fn election(&self, id: ElectionId) -> Result<ElectionOutput, LookupError>;
}

#[rocket::async_trait]
pub trait PartyLookup: Send + Sync {
    async fn party(&self, id: PartyId) -> Result<PartyOutput, LookupError>;
}

#[rocket::async_trait]
pub trait VoteLookup: Send + Sync {
    /// Whether any vote has been cast for the candidate.
    async fn has_votes(&self, id: CandidateId) -> Result<bool, LookupError>;
}

/// Vote lookup used when no vote service is configured: nobody has votes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVotes;

#[rocket::async_trait]
impl VoteLookup for NoVotes {
    async fn has_votes(&self, _id: CandidateId) -> Result<bool, LookupError> {
        Ok(false)
    }
}
