use mongodb::bson::doc;
use rocket::{futures::TryStreamExt, http::Status, serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            auth::AdminAccess,
            ballot_pen::{BallotPenDescription, BallotPenSpec, PenAssignment},
            candidate_list::{
                CandidateDescription, CandidateListDescription, CandidateListSpec, CandidateSpec,
            },
            credentials::Credentials,
            voter::VoterDescription,
        },
        common::VoterId,
        db::{Account, BallotPen, Candidate, CandidateList, Voter},
        mongodb::{is_duplicate_key_error, u32_id_filter, Coll, Counter},
    },
    Config,
};

use super::common::{by_id, insert_candidate, insert_candidate_list, lists_with_candidates};

pub fn routes() -> Vec<Route> {
    routes![
        register,
        get_voters,
        create_candidate_list,
        create_candidate,
        view_candidate_lists,
        create_ballot_pen,
        get_ballot_pens,
        assign_ballot_pen,
    ]
}

fn username_taken() -> Error {
    Error::bad_request("Username already exists.")
}

fn serial_taken() -> Error {
    Error::bad_request("Ballot pen with this serial number already exists.")
}

async fn ensure_voter_exists(voter_id: VoterId, voters: &Coll<Voter>) -> Result<()> {
    if voters.count_documents(u32_id_filter(voter_id), None).await? == 0 {
        return Err(Error::not_found(format!("Voter {voter_id}")));
    }
    Ok(())
}

#[post("/register", data = "<credentials>", format = "json")]
async fn register(
    _access: AdminAccess,
    credentials: Json<Credentials>,
    voters: Coll<Voter>,
    counters: Coll<Counter>,
    config: &State<Config>,
) -> Result<Json<VoterDescription>> {
    if voters.count_documents(None, None).await? >= config.max_voters() {
        return Err(Error::bad_request(
            "User limit reached. Registration is closed.",
        ));
    }

    let account: Account = credentials.0.try_into()?;

    let with_username = doc! {
        "username": &account.username,
    };
    if voters.find_one(with_username, None).await?.is_some() {
        return Err(username_taken());
    }

    let voter = Voter {
        id: Counter::next_id::<Voter>(&counters).await?,
        account,
    };
    // The unique index catches a concurrent registration of the same name.
    if let Err(e) = voters.insert_one(&voter, None).await {
        return Err(if is_duplicate_key_error(&e) {
            username_taken()
        } else {
            e.into()
        });
    }
    info!("Registered voter {} ({})", voter.id, voter.username);

    Ok(Json(voter.into()))
}

#[get("/voters")]
async fn get_voters(
    _access: AdminAccess,
    voters: Coll<Voter>,
) -> Result<Json<Vec<VoterDescription>>> {
    let voters = voters
        .find(None, by_id())
        .await?
        .map_ok(VoterDescription::from)
        .try_collect::<Vec<_>>()
        .await?;
    Ok(Json(voters))
}

#[post("/create-candidate-list", data = "<spec>", format = "json")]
async fn create_candidate_list(
    _access: AdminAccess,
    spec: Json<CandidateListSpec>,
    lists: Coll<CandidateList>,
    counters: Coll<Counter>,
) -> Result<Json<CandidateListDescription>> {
    let list = insert_candidate_list(spec.0, &lists, &counters).await?;
    Ok(Json(CandidateListDescription::group(vec![list], Vec::new()).remove(0)))
}

#[post("/create-candidate", data = "<spec>", format = "json")]
async fn create_candidate(
    _access: AdminAccess,
    spec: Json<CandidateSpec>,
    lists: Coll<CandidateList>,
    candidates: Coll<Candidate>,
    counters: Coll<Counter>,
) -> Result<Json<CandidateDescription>> {
    let candidate = insert_candidate(spec.0, &lists, &candidates, &counters).await?;
    Ok(Json(candidate.into()))
}

#[get("/view-candidate-lists")]
async fn view_candidate_lists(
    _access: AdminAccess,
    lists: Coll<CandidateList>,
    candidates: Coll<Candidate>,
) -> Result<Json<Vec<CandidateListDescription>>> {
    Ok(Json(lists_with_candidates(&lists, &candidates).await?))
}

#[post("/create-ballot-pen", data = "<spec>", format = "json")]
async fn create_ballot_pen(
    _access: AdminAccess,
    spec: Json<BallotPenSpec>,
    pens: Coll<BallotPen>,
    voters: Coll<Voter>,
    counters: Coll<Counter>,
) -> Result<Json<BallotPenDescription>> {
    let BallotPenSpec {
        serial_number,
        user_id,
    } = spec.0;
    let serial_number = serial_number.trim().to_string();
    if serial_number.is_empty() {
        return Err(Error::bad_request("Serial number is required."));
    }

    let with_serial = doc! {
        "serial_number": &serial_number,
    };
    if pens.find_one(with_serial, None).await?.is_some() {
        return Err(serial_taken());
    }
    if let Some(user_id) = user_id {
        ensure_voter_exists(user_id, &voters).await?;
    }

    let pen = BallotPen::new(
        Counter::next_id::<BallotPen>(&counters).await?,
        serial_number,
        user_id,
    );
    if let Err(e) = pens.insert_one(&pen, None).await {
        return Err(if is_duplicate_key_error(&e) {
            serial_taken()
        } else {
            e.into()
        });
    }
    info!("Created ballot pen {} ({})", pen.id, pen.serial_number);

    Ok(Json(pen.into()))
}

#[get("/ballot-pens?<available>")]
async fn get_ballot_pens(
    _access: AdminAccess,
    available: Option<bool>,
    pens: Coll<BallotPen>,
) -> Result<Json<Vec<BallotPenDescription>>> {
    // A pen is free to hand out while nobody owns it.
    let filter = match available {
        Some(true) => Some(doc! { "user_id": null }),
        Some(false) => Some(doc! { "user_id": { "$ne": null } }),
        None => None,
    };
    let pens = pens
        .find(filter, by_id())
        .await?
        .map_ok(BallotPenDescription::from)
        .try_collect::<Vec<_>>()
        .await?;
    Ok(Json(pens))
}

#[post("/assign-ballot-pen", data = "<assignment>", format = "json")]
async fn assign_ballot_pen(
    _access: AdminAccess,
    assignment: Json<PenAssignment>,
    pens: Coll<BallotPen>,
    voters: Coll<Voter>,
) -> Result<Json<BallotPenDescription>> {
    let PenAssignment { user_id, pen_id } = assignment.0;

    let mut pen = pens
        .find_one(u32_id_filter(pen_id), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Ballot pen {pen_id}")))?;
    ensure_voter_exists(user_id, &voters).await?;

    if let Some(previous) = pen.user_id.filter(|previous| *previous != user_id) {
        warn!("Ballot pen {pen_id} moves from voter {previous} to voter {user_id}");
    }
    pen.assign(user_id);

    let result = pens.replace_one(u32_id_filter(pen_id), &pen, None).await?;
    if result.matched_count != 1 {
        return Err(Error::Status(
            Status::InternalServerError,
            format!("Ballot pen {pen_id} vanished during assignment"),
        ));
    }
    info!("Assigned ballot pen {pen_id} to voter {user_id}");

    Ok(Json(pen.into()))
}
