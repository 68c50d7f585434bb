use mongodb::{bson::doc, options::FindOptions};
use rocket::{futures::TryStreamExt, serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    export::{electors_sheet, snapshot_path, Spreadsheet},
    model::{
        api::{
            auth::AuthToken,
            elector::{ElectorDescription, ElectorSubmission},
        },
        common::VoterId,
        db::{Elector, Voter},
        mongodb::{is_duplicate_key_error, Coll},
    },
    Config,
};

use super::common::voter_by_token;

pub fn routes() -> Vec<Route> {
    routes![submit_elector, get_electors, export_electors]
}

/// All records submitted by one voter, oldest first.
async fn electors_of(
    voter_id: VoterId,
    electors: &Coll<Elector>,
) -> Result<Vec<ElectorDescription>> {
    let filter = doc! {
        "voter_id": voter_id,
    };
    let options = FindOptions::builder()
        .sort(doc! { "submitted_at": 1, "_id": 1 })
        .build();
    let electors = electors
        .find(filter, options)
        .await?
        .map_ok(ElectorDescription::from)
        .try_collect()
        .await?;
    Ok(electors)
}

#[post("/submit", data = "<submission>", format = "json")]
async fn submit_elector(
    token: AuthToken<Voter>,
    submission: Json<ElectorSubmission>,
    voters: Coll<Voter>,
    electors: Coll<Elector>,
    config: &State<Config>,
) -> Result<Json<ElectorDescription>> {
    let voter = voter_by_token(&token, &voters).await?;

    let elector = Elector::new(submission.elector_id, voter.id);
    if let Err(e) = electors.insert_one(&elector, None).await {
        return Err(if is_duplicate_key_error(&e) {
            Error::bad_request("Elector ID already recorded")
        } else {
            e.into()
        });
    }
    info!("Voter {} recorded elector {}", voter.id, elector.elector_id);

    // Keep the voter's spreadsheet on disk in step with the store.
    let snapshot = electors_sheet(&electors_of(voter.id, &electors).await?)?;
    let path = snapshot_path(config.export_dir(), &voter.username);
    rocket::tokio::fs::write(&path, snapshot).await?;
    info!("Wrote elector snapshot {}", path.display());

    Ok(Json(elector.into()))
}

#[get("/electors")]
async fn get_electors(
    token: AuthToken<Voter>,
    electors: Coll<Elector>,
) -> Result<Json<Vec<ElectorDescription>>> {
    Ok(Json(electors_of(token.id, &electors).await?))
}

#[get("/export")]
async fn export_electors(
    token: AuthToken<Voter>,
    voters: Coll<Voter>,
    electors: Coll<Elector>,
) -> Result<Spreadsheet> {
    let voter = voter_by_token(&token, &voters).await?;
    let records = electors_of(voter.id, &electors).await?;
    Ok(Spreadsheet {
        filename: format!("{}_electors.xlsx", voter.username),
        bytes: electors_sheet(&records)?,
    })
}
