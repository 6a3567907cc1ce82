//! Client for the PsychonautWiki MediaWiki API.
//!
//! Every operation funnels through one cached, retried GET against
//! `api.php`. The fully-formed URL doubles as the cache key, so identical
//! queries — no matter which resolver issued them — share one upstream
//! fetch per TTL window.

pub mod ask;
pub mod cache;
pub mod error;
pub mod page;
pub mod semantic;
pub mod substance;
pub mod wikitext;

pub use error::{PsychonautError, Result};

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use ask::{AskPage, SubstanceSelector};
use cache::SwrCache;
use page::PageImage;
use substance::SubstanceRecord;

pub const DEFAULT_API_URL: &str = "https://psychonautwiki.org/w/api.php";
pub const DEFAULT_CDN_URL: &str = "https://psychonautwiki.org/";
pub const DEFAULT_THUMB_SIZE: u32 = 100;

const USER_AGENT: &str = "bifrost/2.0 (GraphQL gateway for PsychonautWiki)";
const DEFAULT_PARAMS: [(&str, &str); 2] = [("action", "ask"), ("format", "json")];
const MAX_ATTEMPTS: u64 = 3;
const BACKOFF_STEP_MS: u64 = 1000;

#[derive(Clone)]
pub struct PsychonautClient {
    http: reqwest::Client,
    api_url: String,
    cdn_url: String,
    thumb_size: u32,
    cache: SwrCache<Value>,
}

impl PsychonautClient {
    pub fn new(cache_ttl: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            api_url: DEFAULT_API_URL.to_string(),
            cdn_url: DEFAULT_CDN_URL.to_string(),
            thumb_size: DEFAULT_THUMB_SIZE,
            cache: SwrCache::new(cache_ttl),
        }
    }

    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.to_string();
        self
    }

    pub fn with_cdn_url(mut self, cdn_url: &str) -> Self {
        self.cdn_url = cdn_url.to_string();
        self
    }

    pub fn with_thumb_size(mut self, thumb_size: u32) -> Self {
        self.thumb_size = thumb_size;
        self
    }

    /// Substance listing for one selector, including the fallback lookups
    /// on the title branch. Namespaced titles are dropped: the substance
    /// category is polluted with `Experience:` pages.
    pub async fn search_substances(
        &self,
        selector: &SubstanceSelector,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AskPage>> {
        let primary = ask::substance_query(selector);
        let mut pages = self.ask(&ask::paginate(&primary, limit, offset)).await?;

        if pages.is_empty() {
            if let SubstanceSelector::Query(query) = selector {
                if !query.is_empty() {
                    for fallback in ask::query_fallbacks(query) {
                        pages = self.ask(&ask::paginate(&fallback, limit, offset)).await?;
                        if !pages.is_empty() {
                            break;
                        }
                    }
                }
            }
        }

        pages.retain(|page| !page.name.contains(':'));
        Ok(pages)
    }

    /// Substances carrying any of the given effects.
    pub async fn substances_by_effects(
        &self,
        effects: &[String],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AskPage>> {
        if effects.is_empty() {
            return Ok(Vec::new());
        }
        let query = ask::effects_conjunction(effects);
        self.ask(&ask::paginate(&query, limit, offset)).await
    }

    /// Effects listed on a substance page, read from the `|?Effect`
    /// printouts.
    pub async fn effects_for_substance(
        &self,
        substance: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AskPage>> {
        let query = ask::paginate(&ask::substance_effects(substance), limit, offset);
        let payload = self.request(&[("query", &query)]).await?;
        Ok(ask::project_printouts(&payload, substance))
    }

    /// Effect listing, optionally narrowed to one effect name.
    pub async fn search_effects(
        &self,
        effect: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AskPage>> {
        let query = ask::effect_query(effect);
        self.ask(&ask::paginate(&query, limit, offset)).await
    }

    /// Semantic record of one substance page via `browsebysubject`.
    pub async fn substance_semantics(&self, subject: &str) -> Result<SubstanceRecord> {
        let payload = self
            .request(&[("action", "browsebysubject"), ("subject", subject)])
            .await?;
        let semantics = semantic::decode_browse(&payload)?;
        Ok(substance::parse_record(&semantics.properties))
    }

    /// Plain-text abstract of a page's lead section.
    pub async fn page_abstract(&self, page: &str) -> Result<Option<String>> {
        let payload = self
            .request(&[
                ("action", "parse"),
                ("page", page),
                ("prop", "text"),
                ("section", "0"),
            ])
            .await?;
        let summary = page::extract_abstract(&payload);
        if summary.is_none() {
            debug!(page = %page, "no abstract derivable from lead section");
        }
        Ok(summary)
    }

    /// CDN image URLs for every file on a page.
    pub async fn page_images(&self, page: &str) -> Result<Option<Vec<PageImage>>> {
        let payload = self
            .request(&[("action", "parse"), ("page", page), ("prop", "images")])
            .await?;
        Ok(page::derive_images(&payload, &self.cdn_url, self.thumb_size))
    }

    async fn ask(&self, query: &str) -> Result<Vec<AskPage>> {
        let payload = self.request(&[("query", query)]).await?;
        Ok(ask::project_results(&payload))
    }

    /// One cached upstream GET. Defaults merge under the caller's
    /// parameters and the encoded URL is the cache key.
    async fn request(&self, params: &[(&str, &str)]) -> Result<Value> {
        let url = self.build_url(params)?;
        let http = self.http.clone();
        let fetch_url = url.clone();
        self.cache
            .get(url, move || async move { fetch_json(&http, &fetch_url).await })
            .await
    }

    fn build_url(&self, params: &[(&str, &str)]) -> Result<String> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|error| PsychonautError::Parse(format!("invalid API URL: {error}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, default) in DEFAULT_PARAMS {
                let value = params
                    .iter()
                    .find(|(param, _)| *param == key)
                    .map(|(_, value)| *value)
                    .unwrap_or(default);
                pairs.append_pair(key, value);
            }
            for (key, value) in params {
                if DEFAULT_PARAMS.iter().any(|(default, _)| default == key) {
                    continue;
                }
                pairs.append_pair(key, value);
            }
        }
        Ok(url.into())
    }
}

async fn fetch_json(http: &reqwest::Client, url: &str) -> Result<Value> {
    let mut last_error = None;

    for attempt in 1..=MAX_ATTEMPTS {
        debug!(url = %url, attempt, "requesting upstream");
        match http.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response.json::<Value>().await?);
                }
                warn!(url = %url, status = %status, attempt, "upstream returned an error status");
                last_error = Some(PsychonautError::Upstream(format!("HTTP {status}")));
            }
            Err(error) => {
                warn!(url = %url, error = %error, attempt, "upstream request failed");
                last_error = Some(PsychonautError::from(error));
            }
        }

        if attempt < MAX_ATTEMPTS {
            tokio::time::sleep(Duration::from_millis(BACKOFF_STEP_MS * attempt)).await;
        }
    }

    Err(last_error
        .unwrap_or_else(|| PsychonautError::Upstream("request failed after retries".into())))
}
