//! Candidate business rules: validation against the peer services, ballot
//! number uniqueness, and enrichment of stored records with fresh election
//! and party snapshots.

use std::sync::Arc;

use rocket::futures::future::{join, try_join_all};

use crate::error::{Error, Result};
use crate::model::{
    api::{CandidateInput, CandidateOutput, ElectionOutput, GenericOutput, PartyOutput},
    candidate::{BallotNumber, Candidate, CandidateId, ElectionId, NewCandidate, PartyId},
};
use crate::peers::{ElectionLookup, PartyLookup, VoteLookup};
use crate::store::CandidateStore;

pub mod validation;

use validation::{check_fields, number_matches_party};

const ELECTION_SERVICE: &str = "election service";
const PARTY_SERVICE: &str = "party service";
const VOTE_SERVICE: &str = "vote service";

/// Candidate input that passed every check, with the snapshots fetched while
/// checking it.
struct ValidCandidate {
    candidate: NewCandidate,
    election: ElectionOutput,
    party: PartyOutput,
}

/// Orchestrates candidate operations over the store and the peer services.
/// Lives in Rocket managed state.
#[derive(Clone)]
pub struct CandidateService {
    store: Arc<dyn CandidateStore>,
    elections: Arc<dyn ElectionLookup>,
    parties: Arc<dyn PartyLookup>,
    votes: Arc<dyn VoteLookup>,
}

impl CandidateService {
    pub fn new(
        store: Arc<dyn CandidateStore>,
        elections: Arc<dyn ElectionLookup>,
        parties: Arc<dyn PartyLookup>,
        votes: Arc<dyn VoteLookup>,
    ) -> Self {
        Self {
            store,
            elections,
            parties,
            votes,
        }
    }

    /// Every candidate, enriched. Fails if any single enrichment fails.
    pub async fn get_all(&self) -> Result<Vec<CandidateOutput>> {
        let candidates = self.store.find_all().await?;
        try_join_all(candidates.into_iter().map(|c| self.enrich(c))).await
    }

    pub async fn create(&self, input: CandidateInput) -> Result<CandidateOutput> {
        let valid = self.validate(input).await?;
        self.ensure_number_free(&valid.candidate, None).await?;

        let candidate = self.store.insert(valid.candidate).await?;
        info!(
            "Created candidate {} with number {} in election {}",
            candidate.id, candidate.number_election, candidate.election_id
        );
        Ok(CandidateOutput::new(candidate, valid.election, valid.party))
    }

    pub async fn get_by_id(&self, id: Option<CandidateId>) -> Result<CandidateOutput> {
        let id = id.ok_or(Error::InvalidId)?;
        let candidate = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(Error::CandidateNotFound)?;
        self.enrich(candidate).await
    }

    pub async fn update(
        &self,
        id: Option<CandidateId>,
        input: CandidateInput,
    ) -> Result<CandidateOutput> {
        let id = id.ok_or(Error::InvalidId)?;
        self.ensure_no_votes(id).await?;

        let valid = self.validate(input).await?;
        self.ensure_number_free(&valid.candidate, Some(id)).await?;

        let mut candidate = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(Error::CandidateNotFound)?;
        candidate.candidate = valid.candidate;
        self.store.save(&candidate).await?;
        info!("Updated candidate {id}");
        Ok(CandidateOutput::new(candidate, valid.election, valid.party))
    }

    pub async fn delete(&self, id: Option<CandidateId>) -> Result<GenericOutput> {
        let id = id.ok_or(Error::InvalidId)?;
        self.ensure_no_votes(id).await?;

        if !self.store.delete(id).await? {
            return Err(Error::CandidateNotFound);
        }
        info!("Deleted candidate {id}");
        Ok(GenericOutput::new("Candidate deleted"))
    }

    /// The candidate holding `number` in the election, if any.
    pub async fn check_number(
        &self,
        number: BallotNumber,
        election_id: ElectionId,
    ) -> Result<Option<CandidateOutput>> {
        let found = self
            .store
            .find_first_by_number_and_election(number, election_id)
            .await?;
        self.enrich_found(found).await
    }

    /// Some candidate running in the election, if any.
    pub async fn check_election(&self, election_id: ElectionId) -> Result<Option<CandidateOutput>> {
        let found = self.store.find_first_by_election(election_id).await?;
        self.enrich_found(found).await
    }

    /// Some candidate running for the party, if any.
    pub async fn check_party(&self, party_id: PartyId) -> Result<Option<CandidateOutput>> {
        let found = self.store.find_first_by_party(party_id).await?;
        self.enrich_found(found).await
    }

    /// Check local rules, then the party and the election.
    async fn validate(&self, input: CandidateInput) -> Result<ValidCandidate> {
        let candidate = check_fields(input)?;

        let (party, election) = self
            .fetch_snapshots(candidate.party_id, candidate.election_id)
            .await;
        let party = party?;
        if !number_matches_party(candidate.number_election, party.number) {
            return Err(Error::NumberPartyMismatch);
        }
        let election = election?;

        Ok(ValidCandidate {
            candidate,
            election,
            party,
        })
    }

    /// Fail if another candidate already holds the ballot number.
    async fn ensure_number_free(
        &self,
        candidate: &NewCandidate,
        except: Option<CandidateId>,
    ) -> Result<()> {
        let holder = self
            .store
            .find_first_by_number_and_election(candidate.number_election, candidate.election_id)
            .await?;
        match holder {
            Some(holder) if Some(holder.id) != except => Err(Error::DuplicateCandidate),
            _ => Ok(()),
        }
    }

    async fn ensure_no_votes(&self, id: CandidateId) -> Result<()> {
        let has_votes = self.votes.has_votes(id).await.map_err(|err| {
            Error::UpstreamUnavailable(format!("{VOTE_SERVICE}: {err}"))
        })?;
        if has_votes {
            return Err(Error::VotesExist);
        }
        Ok(())
    }

    async fn enrich(&self, candidate: Candidate) -> Result<CandidateOutput> {
        let (party, election) = self
            .fetch_snapshots(candidate.party_id, candidate.election_id)
            .await;
        let party = party?;
        let election = election?;
        Ok(CandidateOutput::new(candidate, election, party))
    }

    async fn enrich_found(&self, found: Option<Candidate>) -> Result<Option<CandidateOutput>> {
        match found {
            Some(candidate) => Ok(Some(self.enrich(candidate).await?)),
            None => Ok(None),
        }
    }

    /// Look up the party and the election concurrently.
    async fn fetch_snapshots(
        &self,
        party_id: PartyId,
        election_id: ElectionId,
    ) -> (Result<PartyOutput>, Result<ElectionOutput>) {
        let party = async {
            self.parties
                .party(party_id)
                .await
                .map_err(|err| err.into_error(PARTY_SERVICE, Error::InvalidParty))
        };
        let election = async {
            self.elections
                .election(election_id)
                .await
                .map_err(|err| err.into_error(ELECTION_SERVICE, Error::InvalidElection))
        };
        join(party, election).await
    }
}
