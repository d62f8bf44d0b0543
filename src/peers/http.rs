use std::time::Duration;

use reqwest::{Client, StatusCode};
use rocket::tokio::time::sleep;
use serde::de::{DeserializeOwned, IgnoredAny};

use crate::model::{
    api::{ElectionOutput, PartyOutput},
    candidate::{CandidateId, ElectionId, PartyId},
};

use super::{ElectionLookup, LookupError, PartyLookup, VoteLookup};

/// Pause before the first retry. Doubles with every further attempt.
pub const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// JSON-over-HTTP access to one peer service.
#[derive(Debug, Clone)]
pub struct PeerClient {
    http: Client,
    base_url: String,
    retries: u32,
}

impl PeerClient {
    /// Create a client rooted at `base_url`. Every request gives up after
    /// `timeout`, and transient failures are retried `retries` times.
    pub fn new(base_url: &str, timeout: Duration, retries: u32) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            retries,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, LookupError> {
        let url = self.url(path);
        let mut attempt = 0;
        loop {
            match self.try_get_json(&url).await {
                Err(err) if err.is_transient() && attempt < self.retries => {
                    let backoff = RETRY_BACKOFF * 2u32.saturating_pow(attempt);
                    attempt += 1;
                    warn!(
                        "GET {url} failed ({err}), retrying in {}ms ({attempt}/{})",
                        backoff.as_millis(),
                        self.retries
                    );
                    sleep(backoff).await;
                }
                result => return result,
            }
        }
    }

    async fn try_get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, LookupError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| LookupError::Unavailable(e.to_string()))?;
        classify_status(response.status())?;
        response
            .json::<T>()
            .await
            .map_err(|e| LookupError::Unavailable(format!("malformed response from {url}: {e}")))
    }
}

/// Map a non-success status onto the lookup error it stands for.
fn classify_status(status: StatusCode) -> Result<(), LookupError> {
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::NOT_FOUND {
        Err(LookupError::NotFound)
    } else if status.is_server_error() {
        Err(LookupError::ServerError(status.as_u16()))
    } else {
        Err(LookupError::Rejected(status.as_u16()))
    }
}

/// Election service client: `GET /v1/election/{id}`.
#[derive(Debug, Clone)]
pub struct HttpElectionClient(PeerClient);

impl HttpElectionClient {
    pub fn new(peer: PeerClient) -> Self {
        Self(peer)
    }
}

#[rocket::async_trait]
impl ElectionLookup for HttpElectionClient {
    async fn election(&self, id: ElectionId) -> Result<ElectionOutput, LookupError> {
        self.0.get_json(&format!("v1/election/{id}")).await
    }
}

/// Party service client: `GET /v1/party/{id}`.
#[derive(Debug, Clone)]
pub struct HttpPartyClient(PeerClient);

impl HttpPartyClient {
    pub fn new(peer: PeerClient) -> Self {
        Self(peer)
    }
}

#[rocket::async_trait]
impl PartyLookup for HttpPartyClient {
    async fn party(&self, id: PartyId) -> Result<PartyOutput, LookupError> {
        self.0.get_json(&format!("v1/party/{id}")).await
    }
}

/// Vote service client: `GET /v1/vote/candidate/{id}` lists the votes for a
/// candidate. A candidate the vote service has never heard of has no votes.
#[derive(Debug, Clone)]
pub struct HttpVoteClient(PeerClient);

impl HttpVoteClient {
    pub fn new(peer: PeerClient) -> Self {
        Self(peer)
    }
}

#[rocket::async_trait]
impl VoteLookup for HttpVoteClient {
    async fn has_votes(&self, id: CandidateId) -> Result<bool, LookupError> {
        match self
            .0
            .get_json::<Vec<IgnoredAny>>(&format!("v1/vote/candidate/{id}"))
            .await
        {
            Ok(votes) => Ok(!votes.is_empty()),
            Err(LookupError::NotFound) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
