use futures::stream::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};
use mongodb::error::Result;
use mongodb::options::{FindOneOptions, FindOptions, IndexOptions, UpdateOptions};
use mongodb::results::{DeleteResult, InsertOneResult, UpdateResult};
use mongodb::{Client, Collection, IndexModel};

use crate::models::toy::ToyListing;

const DATABASE_NAME: &str = "myFunLearnToy";
const COLLECTION_NAME: &str = "alltoys";

// Fixed page size for the unfiltered listing route.
const LIST_LIMIT: i64 = 20;

pub struct ToyRepository {
    collection: Collection<ToyListing>,
}

impl ToyRepository {
    pub fn new(client: &Client) -> Self {
        let db = client.database(DATABASE_NAME);
        let collection = db.collection::<ToyListing>(COLLECTION_NAME);
        ToyRepository { collection }
    }

    pub async fn ensure_name_index(&self) -> Result<String> {
        let index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(IndexOptions::builder().name("name".to_string()).build())
            .build();

        let result = self.collection.create_index(index, None).await?;
        Ok(result.index_name)
    }

    pub async fn get_all_toys(&self) -> Result<Vec<ToyListing>> {
        let options = FindOptions::builder().limit(LIST_LIMIT).build();
        let mut cursor = self.collection.find(None, options).await?;

        let mut toys = Vec::new();
        while let Some(toy) = cursor.try_next().await? {
            toys.push(toy);
        }
        Ok(toys)
    }

    pub async fn find_toy_by_id(&self, id: ObjectId) -> Result<Option<ToyListing>> {
        let filter = doc! { "_id": id };
        let options = FindOneOptions::builder()
            .projection(listing_projection())
            .build();

        self.collection.find_one(filter, options).await
    }

    // Full document, no projection; used to pre-fill the edit form.
    pub async fn find_full_toy_by_id(&self, id: ObjectId) -> Result<Option<ToyListing>> {
        let filter = doc! { "_id": id };
        self.collection.find_one(filter, None).await
    }

    pub async fn get_toys_by_owner(&self, created_by: Option<&str>) -> Result<Vec<ToyListing>> {
        let filter = created_by.map(|owner| doc! { "created_by": owner });
        let options = FindOptions::builder().sort(doc! { "price": -1 }).build();
        let mut cursor = self.collection.find(filter, options).await?;

        let mut toys = Vec::new();
        while let Some(toy) = cursor.try_next().await? {
            toys.push(toy);
        }
        Ok(toys)
    }

    pub async fn insert_toy(&self, toy: ToyListing) -> Result<InsertOneResult> {
        self.collection.insert_one(toy, None).await
    }

    // Replaces the listed fields only; `_id` is never rewritten. Inserts a
    // new document when no listing matches the id.
    pub async fn upsert_toy(&self, id: ObjectId, toy: &ToyListing) -> Result<UpdateResult> {
        let filter = doc! { "_id": id };
        let update = doc! { "$set": set_fields(toy) };
        let options = UpdateOptions::builder().upsert(true).build();

        self.collection.update_one(filter, update, options).await
    }

    pub async fn delete_toy(&self, id: ObjectId) -> Result<DeleteResult> {
        let filter = doc! { "_id": id };
        self.collection.delete_one(filter, None).await
    }

    pub async fn search_toys_by_name(&self, text: &str) -> Result<Vec<ToyListing>> {
        let mut cursor = self.collection.find(name_search_filter(text), None).await?;

        let mut toys = Vec::new();
        while let Some(toy) = cursor.try_next().await? {
            toys.push(toy);
        }
        Ok(toys)
    }
}

fn listing_projection() -> Document {
    doc! {
        "picture_url": 1,
        "name": 1,
        "seller_name": 1,
        "seller_email": 1,
        "sub_category": 1,
        "price": 1,
        "rating": 1,
        "available_quantity": 1,
        "created_by": 1,
        "description": 1,
    }
}

fn set_fields(toy: &ToyListing) -> Document {
    doc! {
        "picture_url": toy.picture_url.clone(),
        "name": toy.name.clone(),
        "seller_name": toy.seller_name.clone(),
        "seller_email": toy.seller_email.clone(),
        "sub_category": toy.sub_category.clone(),
        "price": toy.price,
        "rating": toy.rating,
        "available_quantity": toy.available_quantity,
        "created_by": toy.created_by.clone(),
        "description": toy.description.clone(),
    }
}

// The fragment is escaped so regex metacharacters match literally.
fn name_search_filter(text: &str) -> Document {
    doc! {
        "name": {
            "$regex": regex::escape(text),
            "$options": "i",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toy() -> ToyListing {
        ToyListing {
            id: Some(ObjectId::new()),
            picture_url: "https://example.com/robot.png".to_string(),
            name: "Wind-Up Robot".to_string(),
            seller_name: "Grace".to_string(),
            seller_email: "grace@example.com".to_string(),
            sub_category: "robots".to_string(),
            price: 19.5,
            rating: 4.7,
            available_quantity: 3,
            created_by: "grace@example.com".to_string(),
            description: "Clockwork robot, winds on the left side".to_string(),
        }
    }

    #[test]
    fn set_fields_covers_exactly_the_replaceable_fields() {
        let document = set_fields(&sample_toy());

        let keys: Vec<&str> = document.keys().map(|key| key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "picture_url",
                "name",
                "seller_name",
                "seller_email",
                "sub_category",
                "price",
                "rating",
                "available_quantity",
                "created_by",
                "description",
            ]
        );
        assert!(!document.contains_key("_id"));
    }

    #[test]
    fn projection_names_the_same_fields_the_update_replaces() {
        let projection = listing_projection();
        let replaced = set_fields(&sample_toy());

        let projected: Vec<&str> = projection.keys().map(|key| key.as_str()).collect();
        let updated: Vec<&str> = replaced.keys().map(|key| key.as_str()).collect();
        assert_eq!(projected, updated);
    }

    #[test]
    fn name_search_filter_is_case_insensitive() {
        let filter = name_search_filter("red car");
        let name = filter.get_document("name").unwrap();

        assert_eq!(name.get_str("$regex").unwrap(), "red car");
        assert_eq!(name.get_str("$options").unwrap(), "i");
    }

    #[test]
    fn name_search_filter_escapes_regex_metacharacters() {
        let filter = name_search_filter("r2.d2 (blue)");
        let name = filter.get_document("name").unwrap();

        assert_eq!(name.get_str("$regex").unwrap(), "r2\\.d2 \\(blue\\)");
    }
}
