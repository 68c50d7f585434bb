use mongodb::{bson::doc, options::FindOptions};
use rocket::futures::TryStreamExt;

use crate::error::{Error, Result};
use crate::model::{
    api::{
        auth::AuthToken,
        candidate_list::{CandidateListDescription, CandidateListSpec, CandidateSpec},
    },
    common::ListId,
    db::{Candidate, CandidateList, Voter},
    mongodb::{u32_id_filter, Coll, Counter},
};

/// Get the voter behind a session token.
pub async fn voter_by_token(token: &AuthToken<Voter>, voters: &Coll<Voter>) -> Result<Voter> {
    voters
        .find_one(u32_id_filter(token.id), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Voter {}", token.id)))
}

pub async fn list_by_id(list_id: ListId, lists: &Coll<CandidateList>) -> Result<CandidateList> {
    lists
        .find_one(u32_id_filter(list_id), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Candidate list {list_id}")))
}

/// Sort by `_id`, i.e. creation order.
pub fn by_id() -> FindOptions {
    FindOptions::builder().sort(doc! { "_id": 1 }).build()
}

/// All lists with their candidates, both in creation order.
pub async fn lists_with_candidates(
    lists: &Coll<CandidateList>,
    candidates: &Coll<Candidate>,
) -> Result<Vec<CandidateListDescription>> {
    let all_lists: Vec<CandidateList> = lists.find(None, by_id()).await?.try_collect().await?;
    let all_candidates: Vec<Candidate> =
        candidates.find(None, by_id()).await?.try_collect().await?;
    Ok(CandidateListDescription::group(all_lists, all_candidates))
}

/// Create a list with no votes.
pub async fn insert_candidate_list(
    spec: CandidateListSpec,
    lists: &Coll<CandidateList>,
    counters: &Coll<Counter>,
) -> Result<CandidateList> {
    let name = spec.name.trim();
    if name.is_empty() {
        return Err(Error::bad_request("List name is required."));
    }

    let list = CandidateList::new(
        Counter::next_id::<CandidateList>(counters).await?,
        name.to_string(),
    );
    lists.insert_one(&list, None).await?;
    info!("Created candidate list {} ({})", list.id, list.name);
    Ok(list)
}

/// Create a candidate with no votes on an existing list.
pub async fn insert_candidate(
    spec: CandidateSpec,
    lists: &Coll<CandidateList>,
    candidates: &Coll<Candidate>,
    counters: &Coll<Counter>,
) -> Result<Candidate> {
    let name = spec.name.trim();
    let party = spec.party.trim();
    if name.is_empty() || party.is_empty() {
        return Err(Error::bad_request("Name, party and list are required."));
    }

    // There are no foreign keys, so check the list here.
    let list = list_by_id(spec.list_id, lists).await?;

    let candidate = Candidate::new(
        Counter::next_id::<Candidate>(counters).await?,
        name.to_string(),
        party.to_string(),
        list.id,
    );
    candidates.insert_one(&candidate, None).await?;
    info!(
        "Created candidate {} ({}) on list {}",
        candidate.id, candidate.name, list.id
    );
    Ok(candidate)
}
