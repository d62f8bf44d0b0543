mod collection;
mod counter;
pub mod errors;

pub use collection::{ensure_indexes_exist, id_filter, Coll, MongoCollection};
pub use counter::{ensure_candidate_id_counter_exists, Counter, CANDIDATE_ID_COUNTER_ID};
