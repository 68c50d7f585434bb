use mongodb::{
    bson::doc,
    options::{FindOneAndUpdateOptions, ReturnDocument},
};
use rocket::http::Status;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::mongodb::{Coll, MongoCollection};

/// A counter object used to implement auto-increment integer IDs.
/// There is one counter per collection, named after the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    #[serde(rename = "_id")]
    pub id: String,
    pub next: u32,
}

impl Counter {
    /// Atomically allocate the next ID for documents of type `T`.
    /// The first ID handed out for a collection is 1.
    pub async fn next_id<T: MongoCollection>(counters: &Coll<Counter>) -> Result<u32> {
        let filter = doc! {
            "_id": T::NAME,
        };
        let update = doc! {
            "$inc": { "next": 1 }
        };
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::After)
            .build();
        let counter = counters
            .find_one_and_update(filter, update, options)
            .await?
            .ok_or_else(|| {
                Error::Status(
                    Status::InternalServerError,
                    format!("Failed to allocate ID for {}", T::NAME),
                )
            })?;
        debug!("Allocated {} ID {}", T::NAME, counter.next);
        Ok(counter.next)
    }
}
