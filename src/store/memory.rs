use std::collections::BTreeMap;

use rocket::tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::model::candidate::{
    BallotNumber, Candidate, CandidateId, ElectionId, NewCandidate, PartyId,
};

use super::CandidateStore;

/// Candidates held in process memory, iterated in ascending ID order.
///
/// The uniqueness check and the write happen under the same lock.
#[derive(Default)]
pub struct MemoryCandidateStore {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    last_id: u32,
    candidates: BTreeMap<CandidateId, Candidate>,
}

impl MemoryState {
    fn number_taken(&self, candidate: &NewCandidate, except: Option<CandidateId>) -> bool {
        self.candidates.values().any(|existing| {
            Some(existing.id) != except
                && existing.election_id == candidate.election_id
                && existing.number_election == candidate.number_election
        })
    }

    fn find_first(&self, predicate: impl Fn(&Candidate) -> bool) -> Option<Candidate> {
        self.candidates.values().find(|c| predicate(*c)).cloned()
    }
}

impl MemoryCandidateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored candidates.
    pub async fn len(&self) -> usize {
        self.state.lock().await.candidates.len()
    }
}

#[rocket::async_trait]
impl CandidateStore for MemoryCandidateStore {
    async fn find_all(&self) -> Result<Vec<Candidate>> {
        Ok(self.state.lock().await.candidates.values().cloned().collect())
    }

    async fn find_by_id(&self, id: CandidateId) -> Result<Option<Candidate>> {
        Ok(self.state.lock().await.candidates.get(&id).cloned())
    }

    async fn find_first_by_number_and_election(
        &self,
        number: BallotNumber,
        election_id: ElectionId,
    ) -> Result<Option<Candidate>> {
        let state = self.state.lock().await;
        Ok(state.find_first(|c| c.number_election == number && c.election_id == election_id))
    }

    async fn find_first_by_election(&self, election_id: ElectionId) -> Result<Option<Candidate>> {
        let state = self.state.lock().await;
        Ok(state.find_first(|c| c.election_id == election_id))
    }

    async fn find_first_by_party(&self, party_id: PartyId) -> Result<Option<Candidate>> {
        let state = self.state.lock().await;
        Ok(state.find_first(|c| c.party_id == party_id))
    }

    async fn insert(&self, candidate: NewCandidate) -> Result<Candidate> {
        let mut state = self.state.lock().await;
        if state.number_taken(&candidate, None) {
            return Err(Error::DuplicateCandidate);
        }
        let id = state
            .last_id
            .checked_add(1)
            .and_then(CandidateId::new)
            .ok_or_else(|| Error::Internal("Candidate IDs exhausted".to_string()))?;
        state.last_id = id.get();
        let candidate = Candidate { id, candidate };
        state.candidates.insert(id, candidate.clone());
        Ok(candidate)
    }

    async fn save(&self, candidate: &Candidate) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.candidates.contains_key(&candidate.id) {
            return Err(Error::CandidateNotFound);
        }
        if state.number_taken(&candidate.candidate, Some(candidate.id)) {
            return Err(Error::DuplicateCandidate);
        }
        state.candidates.insert(candidate.id, candidate.clone());
        Ok(())
    }

    async fn delete(&self, id: CandidateId) -> Result<bool> {
        Ok(self.state.lock().await.candidates.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rocket::async_test]
    async fn insert_assigns_increasing_ids() {
        let store = MemoryCandidateStore::new();
        let first = store.insert(NewCandidate::example()).await.unwrap();
        let second = store.insert(NewCandidate::example2()).await.unwrap();
        assert_eq!(first.id.get(), 1);
        assert_eq!(second.id.get(), 2);

        let all = store.find_all().await.unwrap();
        assert_eq!(all, vec![first, second]);
    }

    #[rocket::async_test]
    async fn insert_rejects_number_reuse_within_election() {
        let store = MemoryCandidateStore::new();
        store.insert(NewCandidate::example()).await.unwrap();

        let mut clash = NewCandidate::example2();
        clash.number_election = NewCandidate::example().number_election;
        let err = store.insert(clash.clone()).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateCandidate));

        // The same number is fine in another election.
        clash.election_id = 8;
        store.insert(clash).await.unwrap();
        assert_eq!(store.len().await, 2);
    }

    #[rocket::async_test]
    async fn save_allows_keeping_own_number() {
        let store = MemoryCandidateStore::new();
        let mut candidate = store.insert(NewCandidate::example()).await.unwrap();
        candidate.name = "Maria Souza da Silva".to_string();
        store.save(&candidate).await.unwrap();

        let stored = store.find_by_id(candidate.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Maria Souza da Silva");
    }

    #[rocket::async_test]
    async fn save_rejects_taking_another_number() {
        let store = MemoryCandidateStore::new();
        let first = store.insert(NewCandidate::example()).await.unwrap();
        let mut second = store.insert(NewCandidate::example2()).await.unwrap();
        second.number_election = first.number_election;
        let err = store.save(&second).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateCandidate));
    }

    #[rocket::async_test]
    async fn probes_and_delete() {
        let store = MemoryCandidateStore::new();
        let candidate = store.insert(NewCandidate::example()).await.unwrap();

        assert_eq!(
            store.find_first_by_party(1).await.unwrap(),
            Some(candidate.clone())
        );
        assert_eq!(store.find_first_by_party(2).await.unwrap(), None);
        assert_eq!(
            store.find_first_by_election(7).await.unwrap(),
            Some(candidate.clone())
        );
        assert_eq!(
            store
                .find_first_by_number_and_election(1001, 7)
                .await
                .unwrap(),
            Some(candidate.clone())
        );

        assert!(store.delete(candidate.id).await.unwrap());
        assert!(!store.delete(candidate.id).await.unwrap());
        assert_eq!(store.find_by_id(candidate.id).await.unwrap(), None);
    }
}
