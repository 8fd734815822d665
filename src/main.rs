#[macro_use]
extern crate rocket;

mod config;
mod models;
mod repository;
#[cfg(test)]
mod tests;

use log::{error, info, warn};
use mongodb::bson::oid::ObjectId;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::figment::Figment;
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{Build, Request, Response, Rocket, State};
use serde::{Deserialize, Serialize};

use crate::config::{mongo_config, AppConfig};
use crate::models::toy::ToyListing;
use crate::repository::toy_repository::ToyRepository;

pub struct CORS;

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PUT, DELETE, OPTIONS",
        ));
        response.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "Content-Type, Authorization",
        ));
    }
}

#[options("/<_..>")]
fn all_options() -> Status {
    Status::Ok
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub message: String,
    pub result: Option<T>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UpdateReport {
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct DeleteReport {
    pub deleted_count: u64,
}

#[get("/")]
fn index() -> &'static str {
    "Toy Catalog API is running..."
}

#[get("/alltoys")]
async fn get_all_toys(
    toy_repo: &State<ToyRepository>,
) -> (Status, Json<ApiResponse<Vec<ToyListing>>>) {
    match toy_repo.get_all_toys().await {
        Ok(toys) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success".to_string(),
                result: Some(toys),
            }),
        ),
        Err(e) => {
            error!("Error listing toys: {:?}", e);
            (
                Status::InternalServerError,
                Json(ApiResponse {
                    message: "500: Internal Server Error".to_string(),
                    result: None,
                }),
            )
        }
    }
}

#[get("/toy/<id>")]
async fn get_toy(
    toy_repo: &State<ToyRepository>,
    id: &str,
) -> (Status, Json<ApiResponse<ToyListing>>) {
    let object_id = match ObjectId::parse_str(id) {
        Ok(object_id) => object_id,
        Err(_) => {
            return (
                Status::BadRequest,
                Json(ApiResponse {
                    message: format!("400: Bad Request - '{}' is not a valid listing id", id),
                    result: None,
                }),
            );
        }
    };

    match toy_repo.find_toy_by_id(object_id).await {
        Ok(Some(toy)) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success".to_string(),
                result: Some(toy),
            }),
        ),
        Ok(None) => (
            Status::NotFound,
            Json(ApiResponse {
                message: format!("404: Not Found - Toy {} not found", id),
                result: None,
            }),
        ),
        Err(e) => {
            error!("Error fetching toy {}: {:?}", id, e);
            (
                Status::InternalServerError,
                Json(ApiResponse {
                    message: "500: Internal Server Error".to_string(),
                    result: None,
                }),
            )
        }
    }
}

#[get("/updatetoy/<id>")]
async fn get_toy_for_update(
    toy_repo: &State<ToyRepository>,
    id: &str,
) -> (Status, Json<ApiResponse<ToyListing>>) {
    let object_id = match ObjectId::parse_str(id) {
        Ok(object_id) => object_id,
        Err(_) => {
            return (
                Status::BadRequest,
                Json(ApiResponse {
                    message: format!("400: Bad Request - '{}' is not a valid listing id", id),
                    result: None,
                }),
            );
        }
    };

    match toy_repo.find_full_toy_by_id(object_id).await {
        Ok(Some(toy)) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success".to_string(),
                result: Some(toy),
            }),
        ),
        Ok(None) => (
            Status::NotFound,
            Json(ApiResponse {
                message: format!("404: Not Found - Toy {} not found", id),
                result: None,
            }),
        ),
        Err(e) => {
            error!("Error fetching toy {} for update: {:?}", id, e);
            (
                Status::InternalServerError,
                Json(ApiResponse {
                    message: "500: Internal Server Error".to_string(),
                    result: None,
                }),
            )
        }
    }
}

#[get("/mytoys?<created_by>")]
async fn get_my_toys(
    toy_repo: &State<ToyRepository>,
    created_by: Option<String>,
) -> (Status, Json<ApiResponse<Vec<ToyListing>>>) {
    match toy_repo.get_toys_by_owner(created_by.as_deref()).await {
        Ok(toys) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success".to_string(),
                result: Some(toys),
            }),
        ),
        Err(e) => {
            error!("Error listing toys by owner: {:?}", e);
            (
                Status::InternalServerError,
                Json(ApiResponse {
                    message: "500: Internal Server Error".to_string(),
                    result: None,
                }),
            )
        }
    }
}

#[post("/addToy", format = "json", data = "<new_toy>")]
async fn add_toy(
    toy_repo: &State<ToyRepository>,
    new_toy: Json<ToyListing>,
) -> (Status, Json<ApiResponse<String>>) {
    match toy_repo.insert_toy(new_toy.into_inner()).await {
        Ok(result) => (
            Status::Created,
            Json(ApiResponse {
                message: "201: Created".to_string(),
                result: result
                    .inserted_id
                    .as_object_id()
                    .map(|object_id| object_id.to_hex()),
            }),
        ),
        Err(e) => {
            error!("Error inserting toy: {:?}", e);
            (
                Status::InternalServerError,
                Json(ApiResponse {
                    message: "500: Internal Server Error".to_string(),
                    result: None,
                }),
            )
        }
    }
}

#[put("/mytoys/<id>", format = "json", data = "<updated_toy>")]
async fn update_toy(
    toy_repo: &State<ToyRepository>,
    id: &str,
    updated_toy: Json<ToyListing>,
) -> (Status, Json<ApiResponse<UpdateReport>>) {
    let object_id = match ObjectId::parse_str(id) {
        Ok(object_id) => object_id,
        Err(_) => {
            return (
                Status::BadRequest,
                Json(ApiResponse {
                    message: format!("400: Bad Request - '{}' is not a valid listing id", id),
                    result: None,
                }),
            );
        }
    };

    match toy_repo.upsert_toy(object_id, &updated_toy).await {
        Ok(result) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success".to_string(),
                result: Some(UpdateReport {
                    matched_count: result.matched_count,
                    modified_count: result.modified_count,
                    upserted_id: result
                        .upserted_id
                        .and_then(|id| id.as_object_id())
                        .map(|object_id| object_id.to_hex()),
                }),
            }),
        ),
        Err(e) => {
            error!("Error updating toy {}: {:?}", id, e);
            (
                Status::InternalServerError,
                Json(ApiResponse {
                    message: "500: Internal Server Error".to_string(),
                    result: None,
                }),
            )
        }
    }
}

#[delete("/mytoys/<id>")]
async fn delete_toy(
    toy_repo: &State<ToyRepository>,
    id: &str,
) -> (Status, Json<ApiResponse<DeleteReport>>) {
    let object_id = match ObjectId::parse_str(id) {
        Ok(object_id) => object_id,
        Err(_) => {
            return (
                Status::BadRequest,
                Json(ApiResponse {
                    message: format!("400: Bad Request - '{}' is not a valid listing id", id),
                    result: None,
                }),
            );
        }
    };

    // Deleting a missing listing is not an error; the count is 0.
    match toy_repo.delete_toy(object_id).await {
        Ok(result) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success".to_string(),
                result: Some(DeleteReport {
                    deleted_count: result.deleted_count,
                }),
            }),
        ),
        Err(e) => {
            error!("Error deleting toy {}: {:?}", id, e);
            (
                Status::InternalServerError,
                Json(ApiResponse {
                    message: "500: Internal Server Error".to_string(),
                    result: None,
                }),
            )
        }
    }
}

#[get("/searchToysByName/<text>")]
async fn search_toys_by_name(
    toy_repo: &State<ToyRepository>,
    text: &str,
) -> (Status, Json<ApiResponse<Vec<ToyListing>>>) {
    match toy_repo.search_toys_by_name(text).await {
        Ok(toys) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success".to_string(),
                result: Some(toys),
            }),
        ),
        Err(e) => {
            error!("Error searching toys by name: {:?}", e);
            (
                Status::InternalServerError,
                Json(ApiResponse {
                    message: "500: Internal Server Error".to_string(),
                    result: None,
                }),
            )
        }
    }
}

#[catch(404)]
fn not_found(req: &Request) -> Json<ApiResponse<String>> {
    Json(ApiResponse {
        message: format!("404: '{}' route not found", req.uri()),
        result: None,
    })
}

fn build_rocket(figment: Figment, toy_repo: ToyRepository) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(toy_repo)
        .attach(CORS)
        .mount(
            "/",
            routes![
                index,
                all_options,
                get_all_toys,
                get_toy,
                get_toy_for_update,
                get_my_toys,
                add_toy,
                update_toy,
                delete_toy,
                search_toys_by_name,
            ],
        )
        .register("/", catchers![not_found])
}

#[launch]
async fn rocket() -> _ {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app_config = AppConfig::from_env();

    let client = mongo_config::setup_mongo(&app_config)
        .await
        .unwrap_or_else(|e| panic!("Error {:?} configuring the MongoDB client", e));
    let toy_repo = ToyRepository::new(&client);

    // Index creation and the connectivity check are best effort; the server
    // still comes up when the database is unreachable.
    match toy_repo.ensure_name_index().await {
        Ok(index_name) => info!("Created index \"{}\" on the listings collection", index_name),
        Err(e) => warn!("Could not create the name index: {:?}", e),
    }

    match mongo_config::ping(&client).await {
        Ok(_) => info!("Pinged the deployment. Successfully connected to MongoDB!"),
        Err(e) => warn!("MongoDB connectivity check failed: {:?}", e),
    }

    let figment = rocket::Config::figment().merge(("port", app_config.port));

    build_rocket(figment, toy_repo)
}
