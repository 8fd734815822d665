use mongodb::bson::{doc, Document};
use mongodb::error::Result;
use mongodb::options::{ClientOptions, ServerApi, ServerApiVersion};
use mongodb::Client;

use crate::config::AppConfig;

const APP_NAME: &str = "toy-catalog-api";

pub async fn setup_mongo(config: &AppConfig) -> Result<Client> {
    let mut client_options = ClientOptions::parse(config.connection_string()).await?;
    client_options.app_name = Some(APP_NAME.to_string());
    // Pin the stable server API so driver and server negotiate V1 behavior.
    client_options.server_api = Some(ServerApi::builder().version(ServerApiVersion::V1).build());

    Client::with_options(client_options)
}

pub async fn ping(client: &Client) -> Result<Document> {
    client
        .database("admin")
        .run_command(doc! { "ping": 1 }, None)
        .await
}
