use serde::{Deserialize, Serialize};

use crate::model::candidate::{BallotNumber, Candidate, CandidateId, ElectionId, PartyId};

/// Election snapshot as served by the election service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionOutput {
    pub id: ElectionId,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub state_code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Party snapshot as served by the party service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyOutput {
    pub id: PartyId,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Prefix every candidate number of this party must start with.
    pub number: BallotNumber,
}

/// A stored candidate enriched with fresh election and party snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateOutput {
    pub id: CandidateId,
    pub name: String,
    pub number_election: BallotNumber,
    pub party_id: PartyId,
    pub election_id: ElectionId,
    pub election_output: ElectionOutput,
    pub party_output: PartyOutput,
}

impl CandidateOutput {
    pub fn new(candidate: Candidate, election: ElectionOutput, party: PartyOutput) -> Self {
        Self {
            id: candidate.id,
            name: candidate.candidate.name,
            number_election: candidate.candidate.number_election,
            party_id: candidate.candidate.party_id,
            election_id: candidate.candidate.election_id,
            election_output: election,
            party_output: party,
        }
    }
}

/// Plain message envelope for confirmations and errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericOutput {
    pub message: String,
}

impl GenericOutput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
