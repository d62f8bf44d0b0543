//! In-memory wiring shared by unit tests and `#[backend_test]`.

use std::sync::Arc;

use crate::model::{
    api::{ElectionOutput, PartyOutput},
    candidate::{Candidate, NewCandidate},
};
use crate::peers::memory::{MemoryDirectory, MemoryVotes};
use crate::service::CandidateService;
use crate::store::{CandidateStore, MemoryCandidateStore};

/// Fake collaborators, kept so tests can inspect and tweak them while the
/// service uses them.
pub struct Fakes {
    pub store: Arc<MemoryCandidateStore>,
    pub elections: Arc<MemoryDirectory<ElectionOutput>>,
    pub parties: Arc<MemoryDirectory<PartyOutput>>,
    pub votes: Arc<MemoryVotes>,
}

impl Fakes {
    /// Elections 7 and 8, parties 1 (number 10) and 2 (number 45), no
    /// candidates and no votes.
    pub fn example() -> Self {
        Self {
            store: Arc::new(MemoryCandidateStore::new()),
            elections: Arc::new(MemoryDirectory::of_elections([
                ElectionOutput::example(),
                ElectionOutput::example2(),
            ])),
            parties: Arc::new(MemoryDirectory::of_parties([
                PartyOutput::example(),
                PartyOutput::example2(),
            ])),
            votes: Arc::new(MemoryVotes::new()),
        }
    }

    pub fn service(&self) -> CandidateService {
        CandidateService::new(
            self.store.clone(),
            self.elections.clone(),
            self.parties.clone(),
            self.votes.clone(),
        )
    }

    /// Store the example candidate directly, bypassing validation.
    pub async fn seed(&self) -> Candidate {
        self.store
            .insert(NewCandidate::example())
            .await
            .expect("empty store accepts the example candidate")
    }
}
