use serde::{Deserialize, Serialize};

use crate::model::candidate::{BallotNumber, ElectionId, PartyId};

/// Candidate data as submitted by a client.
///
/// Every field is optional on the wire so that validation can name the first
/// one that is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateInput {
    pub name: Option<String>,
    pub number_election: Option<BallotNumber>,
    pub party_id: Option<PartyId>,
    pub election_id: Option<ElectionId>,
}
