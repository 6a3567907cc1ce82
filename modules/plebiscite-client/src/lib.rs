//! Read-only client for the Plebiscite experience-report collection.
//!
//! The collection is populated by an external scraper; bifrost only ever
//! reads it. Connections are pooled and established lazily by the driver,
//! and reconnection after an error is the driver's concern too.

pub mod error;
pub mod types;

pub use error::{PlebisciteError, Result};
pub use types::{ErowidExperience, ErowidMeta, ErowidSubstanceInfo};

use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Client, Collection};
use tracing::info;

pub struct PlebisciteClient {
    collection: Collection<ErowidExperience>,
}

impl PlebisciteClient {
    pub async fn new(mongo_url: &str, db: &str, collection: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongo_url).await?;
        info!(db = %db, collection = %collection, "Plebiscite store ready");
        Ok(Self {
            collection: client.database(db).collection(collection),
        })
    }

    /// Experience reports, newest first. Filters on the reported substance
    /// only when one is given.
    pub async fn find(
        &self,
        substance: Option<&str>,
        limit: i64,
        offset: u64,
    ) -> Result<Vec<ErowidExperience>> {
        let mut filter = doc! {};
        if let Some(substance) = substance {
            filter.insert("substanceInfo.substance", substance);
        }

        let mut cursor = self
            .collection
            .find(filter)
            .sort(doc! { "meta.published": -1 })
            .skip(offset)
            .limit(limit)
            .await?;

        let mut experiences = Vec::new();
        while let Some(experience) = cursor.try_next().await? {
            experiences.push(experience);
        }
        Ok(experiences)
    }
}
