use std::fmt::{Display, Formatter};
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

use mongodb::bson::Bson;
use rocket::request::FromParam;
use serde::{Deserialize, Serialize};

/// Identifier of an election owned by the election service.
pub type ElectionId = u32;

/// Identifier of a party owned by the party service.
pub type PartyId = u32;

/// Ballot number of a candidate within one election.
pub type BallotNumber = u32;

/// Unique, store-assigned candidate identifier. Always positive.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(u32);

impl CandidateId {
    /// Wrap a raw id, rejecting zero.
    pub fn new(raw: u32) -> Option<Self> {
        (raw > 0).then_some(Self(raw))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Display for CandidateId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error for an id that isn't a positive integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadCandidateId;

impl FromStr for CandidateId {
    type Err = BadCandidateId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .ok()
            .and_then(CandidateId::new)
            .ok_or(BadCandidateId)
    }
}

impl<'a> FromParam<'a> for CandidateId {
    type Error = BadCandidateId;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        param.parse()
    }
}

impl From<CandidateId> for Bson {
    fn from(id: CandidateId) -> Self {
        Bson::Int64(id.0.into())
    }
}

/// Core candidate data: everything except the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCore {
    pub name: String,
    pub number_election: BallotNumber,
    pub party_id: PartyId,
    pub election_id: ElectionId,
}

/// A candidate that has not been stored yet.
pub type NewCandidate = CandidateCore;

/// A stored candidate, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id")]
    pub id: CandidateId,
    #[serde(flatten)]
    pub candidate: CandidateCore,
}

impl Deref for Candidate {
    type Target = CandidateCore;

    fn deref(&self) -> &Self::Target {
        &self.candidate
    }
}

impl DerefMut for Candidate {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.candidate
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_positive_integers() {
        assert_eq!("42".parse::<CandidateId>(), Ok(CandidateId(42)));
        assert_eq!("0".parse::<CandidateId>(), Err(BadCandidateId));
        assert_eq!("-3".parse::<CandidateId>(), Err(BadCandidateId));
        assert_eq!("abc".parse::<CandidateId>(), Err(BadCandidateId));
        assert_eq!(CandidateId::new(0), None);
    }

    #[test]
    fn ids_compare_by_value() {
        let a = CandidateId::new(300).unwrap();
        let b: CandidateId = "300".parse().unwrap();
        assert_eq!(a, b);
    }
}
