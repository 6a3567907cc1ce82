pub mod types;

use std::sync::Arc;

use async_graphql::*;

use plebiscite_client::PlebisciteClient;

use types::Erowid;

#[derive(Default)]
pub struct ErowidQuery;

#[Object]
impl ErowidQuery {
    /// Erowid experience reports, newest first. Only present in the schema
    /// when Plebiscite is configured.
    async fn erowid(
        &self,
        ctx: &Context<'_>,
        substance: Option<String>,
        #[graphql(default = 50)] limit: i32,
        #[graphql(default = 0)] offset: i32,
    ) -> Result<Vec<Erowid>> {
        let store = ctx.data_unchecked::<Arc<PlebisciteClient>>();
        let experiences = store
            .find(
                substance.as_deref(),
                i64::from(limit.max(0)),
                offset.max(0) as u64,
            )
            .await
            .map_err(|err| Error::new(err.to_string()))?;
        Ok(experiences.into_iter().map(Erowid::from).collect())
    }
}
