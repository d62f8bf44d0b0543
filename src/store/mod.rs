//! Candidate persistence.
//!
//! The service only talks to [`CandidateStore`]; [`MongoCandidateStore`] backs
//! the deployed server and [`MemoryCandidateStore`] backs tests and local runs.
//! Both guarantee that a ballot number is used at most once per election,
//! reporting a clash as [`Error::DuplicateCandidate`](crate::error::Error).

use crate::error::Result;
use crate::model::candidate::{
    BallotNumber, Candidate, CandidateId, ElectionId, NewCandidate, PartyId,
};

mod memory;
mod mongo;

pub use memory::MemoryCandidateStore;
pub use mongo::MongoCandidateStore;

#[rocket::async_trait]
pub trait CandidateStore: Send + Sync {
    /// All candidates, in store iteration order.
    async fn find_all(&self) -> Result<Vec<Candidate>>;

    async fn find_by_id(&self, id: CandidateId) -> Result<Option<Candidate>>;

    async fn find_first_by_number_and_election(
        &self,
        number: BallotNumber,
        election_id: ElectionId,
    ) -> Result<Option<Candidate>>;

    async fn find_first_by_election(&self, election_id: ElectionId) -> Result<Option<Candidate>>;

    async fn find_first_by_party(&self, party_id: PartyId) -> Result<Option<Candidate>>;

    /// Store a new candidate, assigning it a fresh ID.
    async fn insert(&self, candidate: NewCandidate) -> Result<Candidate>;

    /// Overwrite the stored candidate with the same ID.
    async fn save(&self, candidate: &Candidate) -> Result<()>;

    /// Remove a candidate. Returns false if there was nothing to remove.
    async fn delete(&self, id: CandidateId) -> Result<bool>;
}
