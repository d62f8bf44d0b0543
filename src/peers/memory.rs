use std::collections::{HashMap, HashSet};

use rocket::tokio::sync::Mutex;

use crate::model::{
    api::{ElectionOutput, PartyOutput},
    candidate::{CandidateId, ElectionId, PartyId},
};

use super::{ElectionLookup, LookupError, PartyLookup, VoteLookup};

/// An in-memory stand-in for the election or party service.
///
/// While an outage is set, every lookup fails with it.
pub struct MemoryDirectory<T> {
    entries: Mutex<HashMap<u32, T>>,
    outage: Mutex<Option<LookupError>>,
}

impl<T: Clone + Send> MemoryDirectory<T> {
    pub fn new(entries: impl IntoIterator<Item = (u32, T)>) -> Self {
        Self {
            entries: Mutex::new(entries.into_iter().collect()),
            outage: Mutex::new(None),
        }
    }

    pub async fn insert(&self, id: u32, entry: T) {
        self.entries.lock().await.insert(id, entry);
    }

    pub async fn remove(&self, id: u32) {
        self.entries.lock().await.remove(&id);
    }

    /// Make every lookup fail with `err` until [`Self::recover`] is called.
    pub async fn fail_with(&self, err: LookupError) {
        *self.outage.lock().await = Some(err);
    }

    pub async fn recover(&self) {
        *self.outage.lock().await = None;
    }

    async fn lookup(&self, id: u32) -> Result<T, LookupError> {
        if let Some(err) = self.outage.lock().await.clone() {
            return Err(err);
        }
        self.entries
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or(LookupError::NotFound)
    }
}

impl MemoryDirectory<ElectionOutput> {
    pub fn of_elections(elections: impl IntoIterator<Item = ElectionOutput>) -> Self {
        Self::new(elections.into_iter().map(|e| (e.id, e)))
    }
}

impl MemoryDirectory<PartyOutput> {
    pub fn of_parties(parties: impl IntoIterator<Item = PartyOutput>) -> Self {
        Self::new(parties.into_iter().map(|p| (p.id, p)))
    }
}

#[rocket::async_trait]
impl ElectionLookup for MemoryDirectory<ElectionOutput> {
    async fn election(&self, id: ElectionId) -> Result<ElectionOutput, LookupError> {
        self.lookup(id).await
    }
}

#[rocket::async_trait]
impl PartyLookup for MemoryDirectory<PartyOutput> {
    async fn party(&self, id: PartyId) -> Result<PartyOutput, LookupError> {
        self.lookup(id).await
    }
}

/// An in-memory stand-in for the vote service.
#[derive(Default)]
pub struct MemoryVotes {
    voted: Mutex<HashSet<CandidateId>>,
}

impl MemoryVotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a vote for the candidate.
    pub async fn vote_for(&self, id: CandidateId) {
        self.voted.lock().await.insert(id);
    }
}

#[rocket::async_trait]
impl VoteLookup for MemoryVotes {
    async fn has_votes(&self, id: CandidateId) -> Result<bool, LookupError> {
        Ok(self.voted.lock().await.contains(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rocket::async_test]
    async fn directory_serves_entries_until_outage() {
        let parties = MemoryDirectory::of_parties([PartyOutput::example()]);
        assert_eq!(parties.party(1).await, Ok(PartyOutput::example()));
        assert_eq!(parties.party(2).await, Err(LookupError::NotFound));

        parties.fail_with(LookupError::ServerError(500)).await;
        assert_eq!(parties.party(1).await, Err(LookupError::ServerError(500)));

        parties.recover().await;
        assert_eq!(parties.party(1).await, Ok(PartyOutput::example()));
    }
}
