use mongodb::bson::{doc, Document};

/// Filter matching the document whose `_id` is the given integer ID.
pub fn u32_id_filter(id: u32) -> Document {
    doc! {
        "_id": id,
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::Bson;

    use super::*;

    #[test]
    fn filter_by_id() {
        let filter = u32_id_filter(42);
        assert_eq!(filter.len(), 1);
        assert_eq!(filter.get("_id"), Some(&Bson::from(42_u32)));
    }
}
