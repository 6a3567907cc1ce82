pub mod types;

use std::sync::Arc;

use async_graphql::*;

use psychonaut_client::PsychonautClient;

use crate::graphql::error;
use crate::graphql::substances::types::Substance;
use types::Effect;

#[derive(Default)]
pub struct EffectQuery;

#[Object]
impl EffectQuery {
    /// Effects attached to a substance page.
    async fn effects_by_substance(
        &self,
        ctx: &Context<'_>,
        substance: String,
        #[graphql(default = 50)] limit: i32,
        #[graphql(default = 0)] offset: i32,
    ) -> Result<Vec<Effect>> {
        let client = ctx.data_unchecked::<Arc<PsychonautClient>>();
        let pages = client
            .effects_for_substance(&substance, i64::from(limit.max(0)), i64::from(offset.max(0)))
            .await
            .map_err(error::upstream)?;
        Ok(pages.into_iter().map(Effect::from_page).collect())
    }

    /// Snake_case alias kept for older clients.
    #[graphql(name = "effects_by_substance")]
    async fn effects_by_substance_snake(
        &self,
        ctx: &Context<'_>,
        substance: String,
        #[graphql(default = 50)] limit: i32,
        #[graphql(default = 0)] offset: i32,
    ) -> Result<Vec<Effect>> {
        self.effects_by_substance(ctx, substance, limit, offset)
            .await
    }

    /// Effect listing, optionally narrowed by name.
    async fn effects(
        &self,
        ctx: &Context<'_>,
        effect: Option<String>,
        #[graphql(default = 50)] limit: i32,
        #[graphql(default = 0)] offset: i32,
    ) -> Result<Vec<Effect>> {
        let client = ctx.data_unchecked::<Arc<PsychonautClient>>();
        let pages = client
            .search_effects(
                effect.as_deref(),
                i64::from(limit.max(0)),
                i64::from(offset.max(0)),
            )
            .await
            .map_err(error::upstream)?;
        Ok(pages.into_iter().map(Effect::from_page).collect())
    }
}

#[ComplexObject]
impl Effect {
    /// Substances reported to produce this effect. Unenriched; nested
    /// fields resolve lazily.
    async fn substances(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = 50)] limit: i32,
        #[graphql(default = 0)] offset: i32,
    ) -> Result<Vec<Substance>> {
        let Some(name) = &self.name else {
            return Ok(Vec::new());
        };
        let client = ctx.data_unchecked::<Arc<PsychonautClient>>();
        let pages = client
            .substances_by_effects(
                &[name.clone()],
                i64::from(limit.max(0)),
                i64::from(offset.max(0)),
            )
            .await
            .map_err(error::upstream)?;
        Ok(pages.into_iter().map(Substance::from_page).collect())
    }
}
