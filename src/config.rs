use std::sync::Arc;
use std::time::Duration;

use mongodb::{Client as MongoClient, Database};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::mongodb::{ensure_candidate_id_counter_exists, ensure_indexes_exist, Coll};
use crate::peers::{
    http::{HttpElectionClient, HttpPartyClient, HttpVoteClient, PeerClient},
    NoVotes, VoteLookup,
};
use crate::service::CandidateService;
use crate::store::MongoCandidateStore;

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Deserialize)]
pub struct Config {
    election_service_url: String,
    party_service_url: String,
    #[serde(default)]
    vote_service_url: Option<String>,
    #[serde(default = "default_upstream_timeout")]
    upstream_timeout: u32,
    #[serde(default = "default_upstream_retries")]
    upstream_retries: u32,
}

fn default_upstream_timeout() -> u32 {
    5
}

fn default_upstream_retries() -> u32 {
    1
}

impl Config {
    /// Base URL of the election service.
    pub fn election_service_url(&self) -> &str {
        &self.election_service_url
    }

    /// Base URL of the party service.
    pub fn party_service_url(&self) -> &str {
        &self.party_service_url
    }

    /// Base URL of the vote service. Without one, votes are never checked.
    pub fn vote_service_url(&self) -> Option<&str> {
        self.vote_service_url.as_deref()
    }

    /// How long a single peer request may take.
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout.into())
    }

    /// How many times a peer request is retried after a transient failure.
    pub fn upstream_retries(&self) -> u32 {
        self.upstream_retries
    }

    fn peer(&self, base_url: &str) -> Result<PeerClient, reqwest::Error> {
        PeerClient::new(base_url, self.upstream_timeout(), self.upstream_retries)
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // secrets
    db_uri: String,
    // non-secrets
    #[serde(default = "default_db_name")]
    db_name: String,
}

fn default_db_name() -> String {
    "candidates".to_string()
}

/// A fairing that loads the MongoDB config, connects to the database,
/// performs any setup necessary, and places both a `Client` and a `Database`
/// into managed state.
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");
        // Construct the connection.
        let client = match MongoClient::with_uri_str(config.db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db = client.database(&config.db_name);

        // Ensure the uniqueness index and the candidate ID counter exist.
        if let Err(e) = ensure_indexes_exist(&db).await {
            error!("Failed to set up database indexes: {e}");
            return Err(rocket);
        }
        if let Err(e) = ensure_candidate_id_counter_exists(&Coll::from_db(&db)).await {
            error!("Failed to set up candidate ID counter: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        // Manage the state.
        rocket = rocket.manage(client).manage(db);
        Ok(rocket)
    }
}

/// A fairing that builds the peer service clients and the candidate service
/// on top of the managed `Config` and `Database`, and places the service into
/// managed state. Must be attached after [`ConfigFairing`] and
/// [`DatabaseFairing`].
pub struct ServiceFairing;

#[rocket::async_trait]
impl Fairing for ServiceFairing {
    fn info(&self) -> Info {
        Info {
            name: "Candidate service",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        let service = match (rocket.state::<Config>(), rocket.state::<Database>()) {
            (Some(config), Some(db)) => build_service(config, db)
                .map_err(|e| format!("Failed to build peer service clients: {e}")),
            _ => Err("Candidate service needs the config and database fairings".to_string()),
        };

        match service {
            Ok(service) => Ok(rocket.manage(service)),
            Err(e) => {
                error!("{e}");
                Err(rocket)
            }
        }
    }
}

fn build_service(config: &Config, db: &Database) -> Result<CandidateService, reqwest::Error> {
    info!(
        "Peer services: elections at {}, parties at {}, votes {}",
        config.election_service_url(),
        config.party_service_url(),
        config.vote_service_url().unwrap_or("not checked"),
    );
    let elections = HttpElectionClient::new(config.peer(config.election_service_url())?);
    let parties = HttpPartyClient::new(config.peer(config.party_service_url())?);
    let votes: Arc<dyn VoteLookup> = match config.vote_service_url() {
        Some(url) => Arc::new(HttpVoteClient::new(config.peer(url)?)),
        None => Arc::new(NoVotes),
    };
    Ok(CandidateService::new(
        Arc::new(MongoCandidateStore::from_db(db)),
        Arc::new(elections),
        Arc::new(parties),
        votes,
    ))
}

#[cfg(test)]
mod tests {
    use rocket::figment::Figment;

    use super::*;

    #[test]
    fn peer_settings_have_defaults() {
        let config: Config = Figment::new()
            .merge(("election_service_url", "http://elections:8081"))
            .merge(("party_service_url", "http://parties:8082"))
            .extract()
            .unwrap();
        assert_eq!(config.election_service_url(), "http://elections:8081");
        assert_eq!(config.vote_service_url(), None);
        assert_eq!(config.upstream_timeout(), Duration::from_secs(5));
        assert_eq!(config.upstream_retries(), 1);
    }

    #[test]
    fn peer_urls_are_required() {
        let result = Figment::new()
            .merge(("election_service_url", "http://elections:8081"))
            .extract::<Config>();
        assert!(result.is_err());
    }

    #[test]
    fn vote_service_is_optional() {
        let config: Config = Figment::new()
            .merge(("election_service_url", "http://elections:8081"))
            .merge(("party_service_url", "http://parties:8082"))
            .merge(("vote_service_url", "http://votes:8083"))
            .merge(("upstream_timeout", 2))
            .extract()
            .unwrap();
        assert_eq!(config.vote_service_url(), Some("http://votes:8083"));
        assert_eq!(config.upstream_timeout(), Duration::from_secs(2));
    }
}
