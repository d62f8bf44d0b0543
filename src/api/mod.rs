use rocket::{http::Status, serde::json::Json, Catcher, Request, Route};

use crate::model::api::GenericOutput;

mod candidate;

/// Mount point of every candidate route.
pub const BASE: &str = "/v1/candidate";

pub fn routes() -> Vec<Route> {
    candidate::routes()
}

pub fn catchers() -> Vec<Catcher> {
    catchers![default_catcher]
}

/// Answer unmatched routes and unparseable requests with the usual envelope.
#[catch(default)]
fn default_catcher(status: Status, req: &Request<'_>) -> (Status, Json<GenericOutput>) {
    debug!("Caught {status} for {} {}", req.method(), req.uri());
    (status, Json(GenericOutput::new(status.reason_lossy())))
}
