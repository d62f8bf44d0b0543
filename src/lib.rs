#[macro_use]
extern crate rocket;

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{ConfigFairing, DatabaseFairing, ServiceFairing};
use crate::logging::LoggerFairing;
use crate::service::CandidateService;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod peers;
pub mod service;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;

/// Build the server, connecting to MongoDB and the peer services named in
/// the configuration during ignition.
pub fn build() -> Rocket<Build> {
    with_routes(rocket::build())
        .attach(ConfigFairing)
        .attach(DatabaseFairing)
        .attach(ServiceFairing)
}

/// Build the server around an already constructed service.
pub fn rocket_for_service(service: CandidateService) -> Rocket<Build> {
    with_routes(rocket::build()).manage(service)
}

fn with_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .attach(LoggerFairing)
        .mount(api::BASE, api::routes())
        .register("/", api::catchers())
}
