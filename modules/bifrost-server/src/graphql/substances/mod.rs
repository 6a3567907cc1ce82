pub mod types;

use std::sync::Arc;

use async_graphql::*;
use futures::stream::{self, StreamExt};
use tracing::warn;

use psychonaut_client::ask::{AskPage, SubstanceSelector};
use psychonaut_client::{PsychonautClient, PsychonautError};

use crate::graphql::effects::types::Effect;
use crate::graphql::error;
use types::{Substance, SubstanceImage};

/// Concurrent upstream fetches per enrichment fan-out. Most of these are
/// cache hits after the first request.
const MAX_CONCURRENT_REQUESTS: usize = 100;

#[derive(Default)]
pub struct SubstanceQuery;

#[Object]
impl SubstanceQuery {
    /// Query substances. The four filters are mutually exclusive; the
    /// `query` branch enriches each hit with its semantic record.
    async fn substances(
        &self,
        ctx: &Context<'_>,
        effect: Option<String>,
        query: Option<String>,
        chemical_class: Option<String>,
        psychoactive_class: Option<String>,
        #[graphql(default = 10)] limit: i32,
        #[graphql(default = 0)] offset: i32,
    ) -> Result<Vec<Substance>> {
        let filters = [&effect, &query, &chemical_class, &psychoactive_class];
        if filters.iter().filter(|filter| filter.is_some()).count() >= 2 {
            return Err(Error::new(
                "effect, query, chemicalClass and psychoactiveClass are mutually exclusive",
            ));
        }

        let client = ctx.data_unchecked::<Arc<PsychonautClient>>();
        let limit = i64::from(limit.max(0));
        let offset = i64::from(offset.max(0));

        let (selector, enrich) = if let Some(effect) = effect {
            (SubstanceSelector::Effect(effect), false)
        } else if let Some(class) = chemical_class {
            (SubstanceSelector::ChemicalClass(class), false)
        } else if let Some(class) = psychoactive_class {
            (SubstanceSelector::PsychoactiveClass(class), false)
        } else if let Some(query) = query {
            (SubstanceSelector::Query(query), true)
        } else {
            (SubstanceSelector::Default, false)
        };

        let pages = client
            .search_substances(&selector, limit, offset)
            .await
            .map_err(error::upstream)?;

        if !enrich {
            return Ok(pages.into_iter().map(Substance::from_page).collect());
        }
        Ok(enrich_pages(client, pages).await)
    }

    /// Substances carrying any of the given effects. Unenriched; nested
    /// fields resolve lazily.
    async fn substances_by_effect(
        &self,
        ctx: &Context<'_>,
        effect: Option<Vec<String>>,
        #[graphql(default = 50)] limit: i32,
        #[graphql(default = 0)] offset: i32,
    ) -> Result<Vec<Substance>> {
        let client = ctx.data_unchecked::<Arc<PsychonautClient>>();
        let pages = client
            .substances_by_effects(
                &effect.unwrap_or_default(),
                i64::from(limit.max(0)),
                i64::from(offset.max(0)),
            )
            .await
            .map_err(error::upstream)?;
        Ok(pages.into_iter().map(Substance::from_page).collect())
    }

    /// Snake_case alias kept for older clients.
    #[graphql(name = "substances_by_effect")]
    async fn substances_by_effect_snake(
        &self,
        ctx: &Context<'_>,
        effect: Option<Vec<String>>,
        #[graphql(default = 50)] limit: i32,
        #[graphql(default = 0)] offset: i32,
    ) -> Result<Vec<Substance>> {
        self.substances_by_effect(ctx, effect, limit, offset).await
    }
}

/// Fetches the semantic record for every page concurrently; list order
/// follows the input. A failed enrichment degrades to the bare page.
pub(crate) async fn enrich_pages(
    client: &Arc<PsychonautClient>,
    pages: Vec<AskPage>,
) -> Vec<Substance> {
    stream::iter(pages)
        .map(|page| {
            let client = Arc::clone(client);
            async move {
                match client.substance_semantics(&page.name).await {
                    Ok(record) => Substance::enriched(page, record),
                    Err(err) => {
                        warn!(substance = %page.name, error = %err, "semantic enrichment failed, returning bare page");
                        Substance::from_page(page)
                    }
                }
            }
        })
        .buffered(MAX_CONCURRENT_REQUESTS)
        .collect()
        .await
}

#[ComplexObject]
impl Substance {
    /// Effects listed on the substance page.
    async fn effects(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = 50)] limit: i32,
        #[graphql(default = 0)] offset: i32,
    ) -> Result<Vec<Effect>> {
        let Some(name) = &self.name else {
            return Ok(Vec::new());
        };
        let client = ctx.data_unchecked::<Arc<PsychonautClient>>();
        let pages = client
            .effects_for_substance(name, i64::from(limit.max(0)), i64::from(offset.max(0)))
            .await
            .map_err(error::upstream)?;
        Ok(pages.into_iter().map(Effect::from_page).collect())
    }

    /// Plain-text abstract of the page's lead section.
    async fn summary(&self, ctx: &Context<'_>) -> Result<Option<String>> {
        let Some(name) = &self.name else {
            return Ok(None);
        };
        let client = ctx.data_unchecked::<Arc<PsychonautClient>>();
        match client.page_abstract(name).await {
            Ok(summary) => Ok(summary),
            Err(PsychonautError::Parse(err)) => {
                warn!(substance = %name, error = %err, "abstract extraction failed");
                Ok(None)
            }
            Err(err) => Err(error::upstream(err)),
        }
    }

    /// Thumb and original CDN URLs for the page's images.
    async fn images(&self, ctx: &Context<'_>) -> Result<Option<Vec<SubstanceImage>>> {
        let Some(name) = &self.name else {
            return Ok(None);
        };
        let client = ctx.data_unchecked::<Arc<PsychonautClient>>();
        match client.page_images(name).await {
            Ok(images) => {
                Ok(images.map(|images| images.into_iter().map(SubstanceImage::from).collect()))
            }
            Err(PsychonautError::Parse(err)) => {
                warn!(substance = %name, error = %err, "image derivation failed");
                Ok(None)
            }
            Err(err) => Err(error::upstream(err)),
        }
    }

    async fn uncertain_interactions(&self, ctx: &Context<'_>) -> Result<Option<Vec<Substance>>> {
        resolve_interactions(ctx, &self.uncertain_interactions_raw).await
    }

    async fn unsafe_interactions(&self, ctx: &Context<'_>) -> Result<Option<Vec<Substance>>> {
        resolve_interactions(ctx, &self.unsafe_interactions_raw).await
    }

    async fn dangerous_interactions(&self, ctx: &Context<'_>) -> Result<Option<Vec<Substance>>> {
        resolve_interactions(ctx, &self.dangerous_interactions_raw).await
    }
}

/// Resolves raw interaction names to substances, preserving list order.
/// Every nested substance is a fresh lookup that re-enters the cache.
async fn resolve_interactions(
    ctx: &Context<'_>,
    raw: &Option<Vec<String>>,
) -> Result<Option<Vec<Substance>>> {
    let Some(names) = raw else {
        return Ok(None);
    };
    let client = ctx.data_unchecked::<Arc<PsychonautClient>>();
    let resolved = stream::iter(names.clone())
        .map(|name| {
            let client = Arc::clone(client);
            async move { lookup_interaction(&client, &name).await }
        })
        .buffered(MAX_CONCURRENT_REQUESTS)
        .collect()
        .await;
    Ok(Some(resolved))
}

/// Single-match title lookup; anything other than exactly one hit
/// collapses to a name-only stub.
async fn lookup_interaction(client: &Arc<PsychonautClient>, name: &str) -> Substance {
    let selector = SubstanceSelector::Query(name.to_string());
    let mut pages = match client.search_substances(&selector, 1, 0).await {
        Ok(pages) => pages,
        Err(err) => {
            warn!(interaction = %name, error = %err, "interaction lookup failed");
            return Substance::stub(name);
        }
    };
    if pages.len() != 1 {
        return Substance::stub(name);
    }

    let page = pages.remove(0);
    match client.substance_semantics(&page.name).await {
        Ok(record) => Substance::enriched(page, record),
        Err(err) => {
            warn!(interaction = %name, error = %err, "interaction enrichment failed");
            Substance::from_page(page)
        }
    }
}
