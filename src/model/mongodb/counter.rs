use mongodb::{
    bson::doc,
    options::{FindOneAndUpdateOptions, ReturnDocument},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::mongodb::{errors::is_duplicate_key_error, Coll};

/// ID of the counter that hands out candidate IDs.
pub const CANDIDATE_ID_COUNTER_ID: &str = "candidate_id";

/// A counter object used to implement auto-increment fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    #[serde(rename = "_id")]
    pub id: String,
    pub next: u64,
}

impl Counter {
    /// Create a new `Counter` with the given ID, starting at the given value.
    pub fn new(id: impl Into<String>, start: u64) -> Self {
        Self {
            id: id.into(),
            next: start,
        }
    }

    /// Atomically retrieve the next value of the counter with the given ID.
    pub async fn next(counters: &Coll<Counter>, id: &str) -> Result<u64> {
        let update = doc! {
            "$inc": { "next": 1 }
        };
        let options: FindOneAndUpdateOptions = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::Before)
            .build();
        let counter = counters
            .find_one_and_update(doc! { "_id": id }, update, options)
            .await?
            .ok_or_else(|| Error::Internal(format!("Failed to find counter with ID {id}")))?;
        Ok(counter.next)
    }
}

/// Ensure the candidate ID counter exists, creating it at 1 if needed.
///
/// This operation is idempotent, even when several instances start at once.
pub async fn ensure_candidate_id_counter_exists(counters: &Coll<Counter>) -> Result<()> {
    let existing = counters
        .find_one(doc! { "_id": CANDIDATE_ID_COUNTER_ID }, None)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    debug!("Creating candidate ID counter");
    match counters
        .insert_one(Counter::new(CANDIDATE_ID_COUNTER_ID, 1), None)
        .await
    {
        Ok(_) => Ok(()),
        // Another instance got there first.
        Err(err) if is_duplicate_key_error(&err) => Ok(()),
        Err(err) => Err(err.into()),
    }
}
