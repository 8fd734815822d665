use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ToyListing {
    // Assigned by MongoDB on insert; absent on incoming create payloads.
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub picture_url: String,
    pub name: String,
    pub seller_name: String,
    pub seller_email: String,
    pub sub_category: String,
    pub price: f64,
    pub rating: f64,
    pub available_quantity: i32,
    pub created_by: String,
    pub description: String,
}
