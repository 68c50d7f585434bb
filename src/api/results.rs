use mongodb::bson::doc;
use rocket::{futures::TryStreamExt, serde::json::Json, Route};

use crate::{
    error::Result,
    export::{all_lists_sheet, candidate_list_sheet, Spreadsheet},
    model::{
        api::{
            auth::AuthToken,
            candidate_list::CandidateListDescription,
            results::RankedList,
        },
        common::ListId,
        db::{Candidate, CandidateList, Voter},
        mongodb::Coll,
    },
};

use super::common::{by_id, list_by_id, lists_with_candidates};

pub fn routes() -> Vec<Route> {
    routes![sort_votes, export_list, export_candidate_lists]
}

#[get("/sort-votes")]
async fn sort_votes(
    _token: AuthToken<Voter>,
    lists: Coll<CandidateList>,
    candidates: Coll<Candidate>,
) -> Result<Json<Vec<RankedList>>> {
    let ranked = lists_with_candidates(&lists, &candidates)
        .await?
        .into_iter()
        .map(RankedList::from)
        .collect();
    Ok(Json(ranked))
}

#[get("/export-list/<list_id>")]
async fn export_list(
    _token: AuthToken<Voter>,
    list_id: ListId,
    lists: Coll<CandidateList>,
    candidates: Coll<Candidate>,
) -> Result<Spreadsheet> {
    let list = list_by_id(list_id, &lists).await?;
    let filter = doc! {
        "list_id": list_id,
    };
    let list_candidates: Vec<Candidate> =
        candidates.find(filter, by_id()).await?.try_collect().await?;
    let list = CandidateListDescription::group(vec![list], list_candidates).remove(0);

    Ok(Spreadsheet {
        filename: format!("{}_candidates.xlsx", list.name),
        bytes: candidate_list_sheet(&list)?,
    })
}

#[get("/export-candidate-lists")]
async fn export_candidate_lists(
    _token: AuthToken<Voter>,
    lists: Coll<CandidateList>,
    candidates: Coll<Candidate>,
) -> Result<Spreadsheet> {
    let lists = lists_with_candidates(&lists, &candidates).await?;
    Ok(Spreadsheet {
        filename: "candidate_lists.xlsx".to_string(),
        bytes: all_lists_sheet(&lists)?,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use calamine::{DataType, Reader, Xlsx};
    use mongodb::Database;
    use rocket::{http::Status, local::asynchronous::Client};

    use crate::export::ALL_LISTS_SHEET;

    use super::*;

    async fn insert_results(db: &Database) {
        Coll::<CandidateList>::from_db(db)
            .insert_many(
                [
                    CandidateList {
                        list_votes: 9,
                        ..CandidateList::example()
                    },
                    CandidateList {
                        list_votes: 4,
                        ..CandidateList::example2()
                    },
                ],
                None,
            )
            .await
            .unwrap();
        Coll::<Candidate>::from_db(db)
            .insert_many(
                [
                    Candidate::example(1, "Amal", 2, 1),
                    Candidate::example(2, "Bassem", 5, 1),
                    Candidate::example(3, "Carla", 2, 1),
                    Candidate::example(4, "Dina", 4, 2),
                ],
                None,
            )
            .await
            .unwrap();
    }

    #[backend_test(voter)]
    async fn results_are_ranked_per_list(client: Client, db: Database) {
        insert_results(&db).await;

        let response = client.get(uri!(sort_votes)).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let ranked: Vec<RankedList> = response.into_json().await.unwrap();

        assert_eq!(ranked.len(), 2);
        let names = ranked[0]
            .candidates
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["Bassem", "Amal", "Carla"]);
        assert_eq!(ranked[0].list_votes, 9);
        assert_eq!(ranked[0].total_votes, 9);
        assert_eq!(ranked[1].list_name, "Reform Bloc");
        assert_eq!(ranked[1].total_votes, 4);
    }

    #[backend_test(voter)]
    async fn export_one_list(client: Client, db: Database) {
        insert_results(&db).await;

        let response = client.get(uri!(export_list(2))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let disposition = response
            .headers()
            .get_one("Content-Disposition")
            .unwrap()
            .to_string();
        assert!(disposition.contains("Reform Bloc_candidates.xlsx"));

        let bytes = response.into_bytes().await.unwrap();
        let mut workbook = Xlsx::new(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range("Reform Bloc").unwrap().unwrap();
        assert_eq!(range.height(), 2);
        assert_eq!(
            range.get_value((1, 0)),
            Some(&DataType::String("Dina".to_string()))
        );
        assert_eq!(range.get_value((1, 2)), Some(&DataType::Float(4.0)));
    }

    #[backend_test(voter)]
    async fn export_unknown_list(client: Client) {
        let response = client.get(uri!(export_list(42))).dispatch().await;
        assert_eq!(Status::NotFound, response.status());
    }

    #[backend_test(voter)]
    async fn export_all_lists(client: Client, db: Database) {
        insert_results(&db).await;

        let response = client.get(uri!(export_candidate_lists)).dispatch().await;
        assert_eq!(Status::Ok, response.status());

        let bytes = response.into_bytes().await.unwrap();
        let mut workbook = Xlsx::new(Cursor::new(bytes)).unwrap();
        let range = workbook.worksheet_range(ALL_LISTS_SHEET).unwrap().unwrap();
        // Header plus one row per candidate.
        assert_eq!(range.height(), 5);
    }

    #[backend_test]
    async fn exports_need_session(client: Client, db: Database) {
        insert_results(&db).await;

        for uri in [
            uri!(sort_votes),
            uri!(export_list(1)),
            uri!(export_candidate_lists),
        ] {
            let response = client.get(uri).dispatch().await;
            assert_eq!(Status::Unauthorized, response.status());
        }
    }
}
