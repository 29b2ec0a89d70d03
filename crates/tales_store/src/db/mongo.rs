//! MongoDB connection bootstrap.

use super::DbResult;
use log::{info, warn};
use mongodb::bson::doc;
use mongodb::options::IndexOptions;
use mongodb::sync::{Client, Database};
use mongodb::IndexModel;
use std::time::Instant;

/// Connects to a MongoDB deployment and verifies it answers `ping`.
pub fn connect_mongo(uri: &str, database: &str) -> DbResult<(Client, Database)> {
    let started_at = Instant::now();
    info!(
        "event=mongo_connect module=db status=start database={}",
        database
    );

    let client = Client::with_uri_str(uri)?;
    let db = client.database(database);
    db.run_command(doc! { "ping": 1 }, None)?;

    info!(
        "event=mongo_connect module=db status=ok database={} duration_ms={}",
        database,
        started_at.elapsed().as_millis()
    );
    Ok((client, db))
}

/// Creates a unique index on `id` for each collection.
///
/// Failures are logged and skipped; a missing index only weakens duplicate
/// detection, lookups keep working.
pub fn ensure_id_indexes(db: &Database, collections: &[&str]) {
    for collection in collections {
        let model = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        match db
            .collection::<mongodb::bson::Document>(collection)
            .create_index(model, None)
        {
            Ok(result) => info!(
                "event=mongo_index module=db status=ok collection={} index={}",
                collection, result.index_name
            ),
            Err(err) => warn!(
                "event=mongo_index module=db status=error collection={} error={}",
                collection, err
            ),
        }
    }
}
