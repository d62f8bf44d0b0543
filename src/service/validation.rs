//! Local checks on candidate input, applied before any peer is consulted.

use crate::error::{Error, Result};
use crate::model::{
    api::CandidateInput,
    candidate::{BallotNumber, NewCandidate},
};

/// Minimum number of characters in a name, not counting spaces.
pub const MIN_NAME_CHARS: usize = 5;

/// Minimum number of space-separated words in a name.
pub const MIN_NAME_WORDS: usize = 2;

/// Check field presence and name shape, in reporting order.
pub fn check_fields(input: CandidateInput) -> Result<NewCandidate> {
    let name = match input.name {
        Some(name) if is_valid_name(&name) => name,
        _ => return Err(Error::InvalidName),
    };
    let number_election = input.number_election.ok_or(Error::InvalidNumber)?;
    let party_id = input.party_id.ok_or(Error::InvalidParty)?;
    let election_id = input.election_id.ok_or(Error::InvalidElection)?;
    Ok(NewCandidate {
        name,
        number_election,
        party_id,
        election_id,
    })
}

/// Only the space character separates words; tabs and other whitespace are
/// part of a word.
pub fn is_valid_name(name: &str) -> bool {
    let name = name.trim();
    let letters = name.chars().filter(|&c| c != ' ').count();
    let words = name.split(' ').filter(|word| !word.is_empty()).count();
    letters >= MIN_NAME_CHARS && words >= MIN_NAME_WORDS
}

/// Whether the ballot number starts with the digits of the party number.
pub fn number_matches_party(number: BallotNumber, party_number: BallotNumber) -> bool {
    number.to_string().starts_with(&party_number.to_string())
}
