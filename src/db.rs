use std::time::Duration;

use anyhow::Result;
use mongodb::{
    Client, Database, IndexModel,
    bson::doc,
    options::{ClientOptions, IndexOptions},
};

use crate::models::Product;
use crate::repository::COLLECTION;

/// Create a MongoDB client. The driver connects lazily, so this only fails
/// on an unparseable connection string.
pub async fn create_client(database_url: &str) -> Result<Client> {
    let mut options = ClientOptions::parse(database_url).await?;
    options.connect_timeout = Some(Duration::from_secs(10));
    options.server_selection_timeout = Some(Duration::from_secs(5));
    let client = Client::with_options(options)?;
    Ok(client)
}

/// Verify the connection and make sure the text index used by keyword
/// search exists. Startup keeps going if this fails; individual requests
/// will then surface store errors.
pub async fn init_store(db: &Database) -> Result<()> {
    db.run_command(doc! { "ping": 1 }).await?;

    let index = IndexModel::builder()
        .keys(doc! { "product": "text", "desc": "text" })
        .options(
            IndexOptions::builder()
                .name("idx_text_search".to_string())
                .build(),
        )
        .build();
    db.collection::<Product>(COLLECTION)
        .create_index(index)
        .await?;

    Ok(())
}
