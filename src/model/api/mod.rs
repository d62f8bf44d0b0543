//! API-friendly types, exchanged as camelCase JSON with clients and peer services.

mod input;
pub use input::CandidateInput;

mod output;
pub use output::{CandidateOutput, ElectionOutput, GenericOutput, PartyOutput};
