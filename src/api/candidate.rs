use rocket::{serde::json::Json, Route, State};

use crate::{
    error::Result,
    logging::RequestId,
    model::{
        api::{CandidateInput, CandidateOutput, GenericOutput},
        candidate::{BallotNumber, CandidateId, ElectionId, PartyId},
    },
    service::CandidateService,
};

pub fn routes() -> Vec<Route> {
    routes![
        get_candidates,
        get_candidate,
        create_candidate,
        update_candidate,
        delete_candidate,
        verify_number,
        verify_election,
        verify_party,
    ]
}

#[get("/")]
async fn get_candidates(service: &State<CandidateService>) -> Result<Json<Vec<CandidateOutput>>> {
    Ok(Json(service.get_all().await?))
}

#[get("/<candidate_id>")]
async fn get_candidate(
    candidate_id: Option<CandidateId>,
    service: &State<CandidateService>,
) -> Result<Json<CandidateOutput>> {
    Ok(Json(service.get_by_id(candidate_id).await?))
}

#[post("/", data = "<input>", format = "json")]
async fn create_candidate(
    input: Json<CandidateInput>,
    request_id: &RequestId,
    service: &State<CandidateService>,
) -> Result<Json<CandidateOutput>> {
    let created = service.create(input.into_inner()).await?;
    debug!("req{request_id} created candidate {}", created.id);
    Ok(Json(created))
}

#[put("/<candidate_id>", data = "<input>", format = "json")]
async fn update_candidate(
    candidate_id: Option<CandidateId>,
    input: Json<CandidateInput>,
    request_id: &RequestId,
    service: &State<CandidateService>,
) -> Result<Json<CandidateOutput>> {
    let updated = service.update(candidate_id, input.into_inner()).await?;
    debug!("req{request_id} updated candidate {}", updated.id);
    Ok(Json(updated))
}

#[delete("/<candidate_id>")]
async fn delete_candidate(
    candidate_id: Option<CandidateId>,
    request_id: &RequestId,
    service: &State<CandidateService>,
) -> Result<Json<GenericOutput>> {
    let deleted = service.delete(candidate_id).await?;
    debug!("req{request_id} deleted candidate {candidate_id:?}");
    Ok(Json(deleted))
}

#[get("/verify/number/<number>/<election_id>")]
async fn verify_number(
    number: BallotNumber,
    election_id: ElectionId,
    service: &State<CandidateService>,
) -> Result<Json<Option<CandidateOutput>>> {
    Ok(Json(service.check_number(number, election_id).await?))
}

#[get("/verify/election/<election_id>")]
async fn verify_election(
    election_id: ElectionId,
    service: &State<CandidateService>,
) -> Result<Json<Option<CandidateOutput>>> {
    Ok(Json(service.check_election(election_id).await?))
}

#[get("/verify/party/<party_id>")]
async fn verify_party(
    party_id: PartyId,
    service: &State<CandidateService>,
) -> Result<Json<Option<CandidateOutput>>> {
    Ok(Json(service.check_party(party_id).await?))
}
