use mongodb::{
    bson::doc,
    error::UNKNOWN_TRANSACTION_COMMIT_RESULT,
    options::{FindOneAndUpdateOptions, ReturnDocument},
    Client, ClientSession,
};
use rocket::{serde::json::Json, Route, State};

use crate::{
    error::{Error, Result},
    model::{
        api::{
            auth::AuthToken,
            ballot::{VoteReceipt, VoteRequest},
            candidate_list::CandidateListDescription,
        },
        common::{CandidateId, ListId},
        db::{Candidate, CandidateList, Voter},
        mongodb::{is_transient_transaction_error, u32_id_filter, Coll},
    },
};

use super::common::{list_by_id, lists_with_candidates};

pub fn routes() -> Vec<Route> {
    routes![ballot_options, cast_vote, vote]
}

#[get("/cast-vote")]
async fn ballot_options(
    _token: AuthToken<Voter>,
    lists: Coll<CandidateList>,
    candidates: Coll<Candidate>,
) -> Result<Json<Vec<CandidateListDescription>>> {
    Ok(Json(lists_with_candidates(&lists, &candidates).await?))
}

#[post("/cast-vote", data = "<request>", format = "json")]
async fn cast_vote(
    token: AuthToken<Voter>,
    request: Json<VoteRequest>,
    lists: Coll<CandidateList>,
    candidates: Coll<Candidate>,
    db_client: &State<Client>,
) -> Result<Json<VoteReceipt>> {
    let receipt = count_vote(&token, request.0, &lists, &candidates, db_client).await?;
    Ok(Json(receipt))
}

#[post("/vote", data = "<request>", format = "json")]
async fn vote(
    token: AuthToken<Voter>,
    request: Json<VoteRequest>,
    lists: Coll<CandidateList>,
    candidates: Coll<Candidate>,
    db_client: &State<Client>,
) -> Result<Json<VoteReceipt>> {
    let receipt = count_vote(&token, request.0, &lists, &candidates, db_client).await?;
    Ok(Json(receipt))
}

/// Transactions conflict when votes on the same list overlap; give up after this many tries.
const MAX_VOTE_ATTEMPTS: u32 = 10;

/// Count one vote for a candidate and its list.
///
/// Either both tallies move by one or neither does.
async fn count_vote(
    token: &AuthToken<Voter>,
    request: VoteRequest,
    lists: &Coll<CandidateList>,
    candidates: &Coll<Candidate>,
    db_client: &Client,
) -> Result<VoteReceipt> {
    let VoteRequest {
        list_id,
        candidate_id,
    } = request;

    let list = list_by_id(list_id, lists).await?;
    let candidate = candidates
        .find_one(u32_id_filter(candidate_id), None)
        .await?
        .ok_or_else(|| Error::not_found(format!("Candidate {candidate_id}")))?;
    candidate.ensure_belongs_to(&list)?;

    let mut session = db_client.start_session(None).await?;
    let mut attempt = 1;
    'transaction: loop {
        session.start_transaction(None).await?;
        let receipt =
            match increment_tallies(list_id, candidate_id, lists, candidates, &mut session).await {
                Ok(receipt) => receipt,
                Err(err) => {
                    if let Err(abort_err) = session.abort_transaction().await {
                        warn!("Failed to abort vote transaction: {abort_err}");
                    }
                    if attempt < MAX_VOTE_ATTEMPTS
                        && matches!(&err, Error::Db(e) if is_transient_transaction_error(e))
                    {
                        debug!("Vote on list {list_id} conflicted, retrying (attempt {attempt})");
                        attempt += 1;
                        continue 'transaction;
                    }
                    return Err(err);
                }
            };

        loop {
            match session.commit_transaction().await {
                Ok(()) => {
                    debug!(
                        "Voter {} counted a vote for candidate {candidate_id} on list {list_id}",
                        token.id
                    );
                    return Ok(receipt);
                }
                Err(err)
                    if attempt < MAX_VOTE_ATTEMPTS
                        && err.contains_label(UNKNOWN_TRANSACTION_COMMIT_RESULT) =>
                {
                    attempt += 1;
                }
                Err(err) if attempt < MAX_VOTE_ATTEMPTS && is_transient_transaction_error(&err) => {
                    attempt += 1;
                    continue 'transaction;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

async fn increment_tallies(
    list_id: ListId,
    candidate_id: CandidateId,
    lists: &Coll<CandidateList>,
    candidates: &Coll<Candidate>,
    session: &mut ClientSession,
) -> Result<VoteReceipt> {
    let after = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    let list = lists
        .find_one_and_update_with_session(
            u32_id_filter(list_id),
            doc! { "$inc": { "list_votes": 1 } },
            after.clone(),
            session,
        )
        .await?
        .ok_or_else(|| Error::not_found(format!("Candidate list {list_id}")))?;

    let candidate_filter = doc! {
        "_id": candidate_id,
        "list_id": list_id,
    };
    let candidate = candidates
        .find_one_and_update_with_session(
            candidate_filter,
            doc! { "$inc": { "votes": 1 } },
            after,
            session,
        )
        .await?
        .ok_or_else(|| Error::bad_request("Candidate does not belong to selected list"))?;

    candidate.ensure_within_list_total(&list)?;

    Ok(VoteReceipt {
        list_id,
        list_votes: list.list_votes,
        candidate_id,
        candidate_votes: candidate.votes,
    })
}

#[cfg(test)]
mod tests {
    use mongodb::Database;
    use rocket::{
        futures::{future::join_all, TryStreamExt},
        http::{ContentType, Status},
        local::asynchronous::{Client, LocalResponse},
        serde::json::serde_json::json,
    };

    use crate::api::common::by_id;

    use super::*;

    async fn insert_examples(db: &Database) {
        let lists = Coll::<CandidateList>::from_db(db);
        lists
            .insert_many([CandidateList::example(), CandidateList::example2()], None)
            .await
            .unwrap();
        Coll::<Candidate>::from_db(db)
            .insert_many(
                [
                    Candidate::example(1, "Amal", 0, 1),
                    Candidate::example(2, "Bassem", 0, 1),
                    Candidate::example(3, "Carla", 0, 2),
                ],
                None,
            )
            .await
            .unwrap();
    }

    async fn post_vote(client: &Client, list_id: u32, candidate_id: u32) -> LocalResponse<'_> {
        client
            .post(uri!(vote))
            .header(ContentType::JSON)
            .body(json!({ "list_id": list_id, "candidate_id": candidate_id }).to_string())
            .dispatch()
            .await
    }

    async fn tallies(
        lists: &Coll<CandidateList>,
        candidates: &Coll<Candidate>,
    ) -> (Vec<u32>, Vec<u32>) {
        let list_votes: Vec<u32> = lists
            .find(None, by_id())
            .await
            .unwrap()
            .map_ok(|list| list.list_votes)
            .try_collect()
            .await
            .unwrap();
        let candidate_votes: Vec<u32> = candidates
            .find(None, by_id())
            .await
            .unwrap()
            .map_ok(|candidate| candidate.votes)
            .try_collect()
            .await
            .unwrap();
        (list_votes, candidate_votes)
    }

    #[backend_test(voter)]
    async fn vote_increments_both_tallies(
        client: Client,
        db: Database,
        lists: Coll<CandidateList>,
        candidates: Coll<Candidate>,
    ) {
        insert_examples(&db).await;

        let response = post_vote(&client, 1, 2).await;
        assert_eq!(Status::Ok, response.status());
        let receipt: VoteReceipt = response.into_json().await.unwrap();
        assert_eq!(
            receipt,
            VoteReceipt {
                list_id: 1,
                list_votes: 1,
                candidate_id: 2,
                candidate_votes: 1,
            }
        );

        assert_eq!(
            tallies(&lists, &candidates).await,
            (vec![1, 0], vec![0, 1, 0])
        );
    }

    #[backend_test(voter)]
    async fn both_vote_routes_keep_lists_consistent(
        client: Client,
        db: Database,
        lists: Coll<CandidateList>,
        candidates: Coll<Candidate>,
    ) {
        insert_examples(&db).await;

        for (list_id, candidate_id) in [(1, 1), (1, 2), (2, 3), (1, 1)] {
            assert_eq!(
                Status::Ok,
                post_vote(&client, list_id, candidate_id).await.status()
            );
        }
        let response = client
            .post(uri!(cast_vote))
            .header(ContentType::JSON)
            .body(json!({ "list_id": 2, "candidate_id": 3 }).to_string())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        let (list_votes, candidate_votes) = tallies(&lists, &candidates).await;
        assert_eq!(list_votes, vec![3, 2]);
        assert_eq!(candidate_votes, vec![2, 1, 2]);
        assert_eq!(
            list_votes.iter().sum::<u32>(),
            candidate_votes.iter().sum::<u32>()
        );
    }

    #[backend_test(voter)]
    async fn overlapping_votes_are_all_counted(
        client: Client,
        db: Database,
        lists: Coll<CandidateList>,
        candidates: Coll<Candidate>,
    ) {
        insert_examples(&db).await;

        // Every vote touches list 1, so the transactions conflict with each other.
        let votes = (0..8).map(|i| post_vote(&client, 1, 1 + i % 2));
        let responses = join_all(votes).await;
        for response in responses {
            assert_eq!(Status::Ok, response.status());
        }

        assert_eq!(
            tallies(&lists, &candidates).await,
            (vec![8, 0], vec![4, 4, 0])
        );
    }

    #[backend_test(voter)]
    async fn mismatched_candidate_changes_nothing(
        client: Client,
        db: Database,
        lists: Coll<CandidateList>,
        candidates: Coll<Candidate>,
    ) {
        insert_examples(&db).await;

        let response = post_vote(&client, 2, 1).await;
        assert_eq!(Status::BadRequest, response.status());
        assert_eq!(
            response.into_string().await.unwrap(),
            "Candidate does not belong to selected list"
        );

        assert_eq!(Status::NotFound, post_vote(&client, 9, 1).await.status());
        assert_eq!(Status::NotFound, post_vote(&client, 1, 9).await.status());

        assert_eq!(
            tallies(&lists, &candidates).await,
            (vec![0, 0], vec![0, 0, 0])
        );
    }

    #[backend_test(voter)]
    async fn overrun_is_rolled_back(
        client: Client,
        db: Database,
        lists: Coll<CandidateList>,
        candidates: Coll<Candidate>,
    ) {
        insert_examples(&db).await;
        // A candidate ahead of its own list can only come from a corrupted store.
        candidates
            .update_one(u32_id_filter(1), doc! { "$set": { "votes": 5 } }, None)
            .await
            .unwrap();

        let response = post_vote(&client, 1, 1).await;
        assert_eq!(Status::BadRequest, response.status());
        assert_eq!(response.into_string().await.unwrap(), "Invalid vote count");

        assert_eq!(
            tallies(&lists, &candidates).await,
            (vec![0, 0], vec![5, 0, 0])
        );
    }

    #[backend_test]
    async fn voting_needs_session(client: Client, db: Database, lists: Coll<CandidateList>) {
        insert_examples(&db).await;

        let response = post_vote(&client, 1, 1).await;
        assert_eq!(Status::Unauthorized, response.status());
        assert_eq!(response.into_string().await.unwrap(), "Not logged in");

        let response = client.get(uri!(ballot_options)).dispatch().await;
        assert_eq!(Status::Unauthorized, response.status());

        let list = lists.find_one(u32_id_filter(1), None).await.unwrap().unwrap();
        assert_eq!(list.list_votes, 0);
    }

    #[backend_test(voter)]
    async fn ballot_options_list_everything(client: Client, db: Database) {
        insert_examples(&db).await;

        let response = client.get(uri!(ballot_options)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let options: Vec<CandidateListDescription> = response.into_json().await.unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].candidates.len(), 2);
        assert_eq!(options[1].candidates.len(), 1);
    }
}
