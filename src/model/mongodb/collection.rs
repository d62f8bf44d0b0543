use std::ops::Deref;

use mongodb::{
    bson::{doc, Document},
    error::Error as DbError,
    options::IndexOptions,
    Collection, Database, IndexModel,
};

use crate::model::candidate::{Candidate, CandidateId};

use super::counter::Counter;

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl MongoCollection for Candidate {
    const NAME: &'static str = "candidates";
}

impl MongoCollection for Counter {
    const NAME: &'static str = "counters";
}

/// Filter matching exactly the candidate with the given ID.
pub fn id_filter(id: CandidateId) -> Document {
    doc! { "_id": id }
}

/// Ensure that all the required indexes exist on the given database.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let unique = IndexOptions::builder().unique(true).build();

    // Ballot numbers are unique within an election.
    let number_index = IndexModel::builder()
        .keys(doc! {"election_id": 1, "number_election": 1})
        .options(unique)
        .build();
    Coll::<Candidate>::from_db(db)
        .create_index(number_index, None)
        .await?;

    // Existence probes by party.
    let party_index = IndexModel::builder().keys(doc! {"party_id": 1}).build();
    Coll::<Candidate>::from_db(db)
        .create_index(party_index, None)
        .await?;

    Ok(())
}
