use async_graphql::*;

use psychonaut_client::ask::AskPage;

/// A subjective effect page.
#[derive(SimpleObject, Clone, Default)]
#[graphql(complex)]
pub struct Effect {
    pub name: Option<String>,
    pub url: Option<String>,
}

impl Effect {
    pub fn from_page(page: AskPage) -> Self {
        Self {
            name: Some(page.name),
            url: Some(page.url),
        }
    }
}
