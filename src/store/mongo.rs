use mongodb::{
    bson::{doc, Document},
    error::Error as DbError,
    Database,
};
use rocket::futures::TryStreamExt;

use crate::error::{Error, Result};
use crate::model::{
    candidate::{BallotNumber, Candidate, CandidateId, ElectionId, NewCandidate, PartyId},
    mongodb::{errors::is_duplicate_key_error, id_filter, Coll, Counter, CANDIDATE_ID_COUNTER_ID},
};

use super::CandidateStore;

/// Candidates stored in the `candidates` MongoDB collection.
///
/// Number uniqueness relies on the index created by
/// [`ensure_indexes_exist`](crate::model::mongodb::ensure_indexes_exist).
#[derive(Clone)]
pub struct MongoCandidateStore {
    candidates: Coll<Candidate>,
    counters: Coll<Counter>,
}

impl MongoCandidateStore {
    pub fn from_db(db: &Database) -> Self {
        Self {
            candidates: Coll::from_db(db),
            counters: Coll::from_db(db),
        }
    }

    async fn find_first(&self, filter: Document) -> Result<Option<Candidate>> {
        Ok(self.candidates.find_one(filter, None).await?)
    }
}

#[rocket::async_trait]
impl CandidateStore for MongoCandidateStore {
    async fn find_all(&self) -> Result<Vec<Candidate>> {
        let candidates = self
            .candidates
            .find(None, None)
            .await?
            .try_collect::<Vec<_>>()
            .await?;
        Ok(candidates)
    }

    async fn find_by_id(&self, id: CandidateId) -> Result<Option<Candidate>> {
        self.find_first(id_filter(id)).await
    }

    async fn find_first_by_number_and_election(
        &self,
        number: BallotNumber,
        election_id: ElectionId,
    ) -> Result<Option<Candidate>> {
        self.find_first(number_filter(number, election_id)).await
    }

    async fn find_first_by_election(&self, election_id: ElectionId) -> Result<Option<Candidate>> {
        self.find_first(doc! { "election_id": election_id }).await
    }

    async fn find_first_by_party(&self, party_id: PartyId) -> Result<Option<Candidate>> {
        self.find_first(doc! { "party_id": party_id }).await
    }

    async fn insert(&self, candidate: NewCandidate) -> Result<Candidate> {
        let next = Counter::next(&self.counters, CANDIDATE_ID_COUNTER_ID).await?;
        let id = u32::try_from(next)
            .ok()
            .and_then(CandidateId::new)
            .ok_or_else(|| Error::Internal(format!("Candidate ID {next} out of range")))?;
        let candidate = Candidate { id, candidate };
        self.candidates
            .insert_one(&candidate, None)
            .await
            .map_err(write_error)?;
        Ok(candidate)
    }

    async fn save(&self, candidate: &Candidate) -> Result<()> {
        let result = self
            .candidates
            .replace_one(id_filter(candidate.id), candidate, None)
            .await
            .map_err(write_error)?;
        if result.matched_count == 0 {
            return Err(Error::CandidateNotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: CandidateId) -> Result<bool> {
        let result = self.candidates.delete_one(id_filter(id), None).await?;
        Ok(result.deleted_count > 0)
    }
}

/// Filter for the candidate holding a ballot number in an election.
fn number_filter(number: BallotNumber, election_id: ElectionId) -> Document {
    doc! {
        "number_election": number,
        "election_id": election_id,
    }
}

/// Translate unique index violations into the domain error.
fn write_error(err: DbError) -> Error {
    if is_duplicate_key_error(&err) {
        Error::DuplicateCandidate
    } else {
        Error::Db(err)
    }
}

#[cfg(test)]
mod tests {
    use mongodb::Client as MongoClient;

    use super::*;
    use crate::model::mongodb::{ensure_candidate_id_counter_exists, ensure_indexes_exist};

    #[test]
    fn number_filter_matches_both_fields() {
        let filter = number_filter(1001, 7);
        assert_eq!(filter.len(), 2);
        assert!(filter.contains_key("number_election"));
        assert!(filter.contains_key("election_id"));
    }

    /// A freshly created database for one test, set up the way the database
    /// fairing sets up the real one. Uses `db_uri` from `Rocket.toml` or
    /// `ROCKET_DB_URI`. Any leftovers from an earlier failed run are dropped
    /// first.
    async fn test_db(test: &str) -> Database {
        let db_uri: String = rocket::Config::figment()
            .extract_inner("db_uri")
            .expect("`db_uri` not set");
        let client = MongoClient::with_uri_str(&db_uri).await.unwrap();
        let db = client.database(&format!("candidates_test_{test}"));
        db.drop(None).await.unwrap();
        ensure_indexes_exist(&db).await.unwrap();
        ensure_candidate_id_counter_exists(&Coll::from_db(&db))
            .await
            .unwrap();
        db
    }

    #[rocket::async_test]
    #[ignore = "needs a MongoDB instance at `db_uri`"]
    async fn ids_come_from_the_counter() {
        let db = test_db("ids").await;
        let store = MongoCandidateStore::from_db(&db);

        let first = store.insert(NewCandidate::example()).await.unwrap();
        let second = store.insert(NewCandidate::example2()).await.unwrap();
        assert_eq!(first.id.get(), 1);
        assert_eq!(second.id.get(), 2);

        let stored = store.find_by_id(second.id).await.unwrap();
        assert_eq!(stored, Some(second.clone()));
        assert_eq!(store.find_all().await.unwrap(), vec![first, second]);

        db.drop(None).await.unwrap();
    }

    #[rocket::async_test]
    #[ignore = "needs a MongoDB instance at `db_uri`"]
    async fn counter_setup_is_idempotent() {
        let db = test_db("counter").await;
        let store = MongoCandidateStore::from_db(&db);
        let counters = Coll::<Counter>::from_db(&db);

        store.insert(NewCandidate::example()).await.unwrap();
        ensure_candidate_id_counter_exists(&counters).await.unwrap();
        ensure_candidate_id_counter_exists(&counters).await.unwrap();

        let next = store.insert(NewCandidate::example2()).await.unwrap();
        assert_eq!(next.id.get(), 2);
        assert_eq!(counters.count_documents(None, None).await.unwrap(), 1);

        db.drop(None).await.unwrap();
    }

    #[rocket::async_test]
    #[ignore = "needs a MongoDB instance at `db_uri`"]
    async fn unique_index_rejects_reused_numbers() {
        let db = test_db("unique").await;
        let store = MongoCandidateStore::from_db(&db);

        let first = store.insert(NewCandidate::example()).await.unwrap();
        let mut clash = NewCandidate::example2();
        clash.number_election = first.number_election;
        let err = store.insert(clash.clone()).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateCandidate), "got {err:?}");

        // Another election may reuse the number.
        clash.election_id = 8;
        store.insert(clash).await.unwrap();

        // Saving onto someone else's number is rejected too.
        let mut second = store.insert(NewCandidate::example2()).await.unwrap();
        second.number_election = first.number_election;
        let err = store.save(&second).await.unwrap_err();
        assert!(matches!(err, Error::DuplicateCandidate), "got {err:?}");

        db.drop(None).await.unwrap();
    }

    #[rocket::async_test]
    #[ignore = "needs a MongoDB instance at `db_uri`"]
    async fn save_and_delete_need_an_existing_candidate() {
        let db = test_db("missing").await;
        let store = MongoCandidateStore::from_db(&db);

        let mut candidate = store.insert(NewCandidate::example()).await.unwrap();
        candidate.name = "Maria Souza da Silva".to_string();
        store.save(&candidate).await.unwrap();
        let stored = store.find_by_id(candidate.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Maria Souza da Silva");

        let ghost = Candidate {
            id: CandidateId::new(9999).unwrap(),
            candidate: NewCandidate::example2(),
        };
        let err = store.save(&ghost).await.unwrap_err();
        assert!(matches!(err, Error::CandidateNotFound), "got {err:?}");

        assert!(store.delete(candidate.id).await.unwrap());
        assert!(!store.delete(candidate.id).await.unwrap());

        db.drop(None).await.unwrap();
    }

    #[rocket::async_test]
    #[ignore = "needs a MongoDB instance at `db_uri`"]
    async fn first_match_queries() {
        let db = test_db("first_match").await;
        let store = MongoCandidateStore::from_db(&db);
        let candidate = store.insert(NewCandidate::example()).await.unwrap();

        assert_eq!(
            store.find_first_by_number_and_election(1001, 7).await.unwrap(),
            Some(candidate.clone())
        );
        assert_eq!(
            store.find_first_by_number_and_election(1001, 8).await.unwrap(),
            None
        );
        assert_eq!(
            store.find_first_by_election(7).await.unwrap(),
            Some(candidate.clone())
        );
        assert_eq!(store.find_first_by_party(1).await.unwrap(), Some(candidate));
        assert_eq!(store.find_first_by_party(2).await.unwrap(), None);

        db.drop(None).await.unwrap();
    }

    #[rocket::async_test]
    #[ignore = "needs a MongoDB instance at `db_uri`"]
    async fn missing_counter_is_an_internal_error() {
        let db = test_db("no_counter").await;
        let counters = Coll::<Counter>::from_db(&db);
        counters.drop(None).await.unwrap();

        let err = MongoCandidateStore::from_db(&db)
            .insert(NewCandidate::example())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Internal(_)), "got {err:?}");

        db.drop(None).await.unwrap();
    }
}
