//! Creation paths open to any logged-in voter, outside the admin origin check.

use rocket::{serde::json::Json, Route};

use crate::{
    error::Result,
    model::{
        api::{
            auth::AuthToken,
            candidate_list::{
                CandidateDescription, CandidateListDescription, CandidateSpec, NewListRequest,
            },
        },
        db::{Candidate, CandidateList, Voter},
        mongodb::{Coll, Counter},
    },
};

use super::common::{insert_candidate, insert_candidate_list};

pub fn routes() -> Vec<Route> {
    routes![create_list, add_candidate]
}

#[post("/create-list", data = "<request>", format = "json")]
async fn create_list(
    token: AuthToken<Voter>,
    request: Json<NewListRequest>,
    lists: Coll<CandidateList>,
    counters: Coll<Counter>,
) -> Result<Json<CandidateListDescription>> {
    debug!("Voter {} is creating a candidate list", token.id);
    let list = insert_candidate_list(request.0.into(), &lists, &counters).await?;
    Ok(Json(CandidateListDescription::group(vec![list], Vec::new()).remove(0)))
}

#[post("/add-candidate", data = "<spec>", format = "json")]
async fn add_candidate(
    token: AuthToken<Voter>,
    spec: Json<CandidateSpec>,
    lists: Coll<CandidateList>,
    candidates: Coll<Candidate>,
    counters: Coll<Counter>,
) -> Result<Json<CandidateDescription>> {
    debug!("Voter {} is adding a candidate", token.id);
    let candidate = insert_candidate(spec.0, &lists, &candidates, &counters).await?;
    Ok(Json(candidate.into()))
}
