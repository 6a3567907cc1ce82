use async_graphql::*;
use tracing::debug;

use crate::graphql::effects::types::Effect;
use crate::graphql::substances::types::Substance;

/// Legacy experience envelope kept for schema compatibility.
#[derive(SimpleObject, Clone, Default)]
pub struct Experience {
    pub substances: Option<Vec<Substance>>,
    pub effects: Option<Vec<Effect>>,
}

#[derive(Default)]
pub struct ExperienceQuery;

#[Object]
impl ExperienceQuery {
    /// Vestigial; kept addressable for old clients and always empty.
    #[graphql(deprecation = "Use substances, substancesByEffect and effectsBySubstance instead")]
    async fn experiences(
        &self,
        substance: Option<String>,
        substances_by_effect: Option<String>,
        effects_by_substance: Option<String>,
    ) -> Vec<Experience> {
        debug!(
            ?substance,
            ?substances_by_effect,
            ?effects_by_substance,
            "experiences query is vestigial"
        );
        Vec::new()
    }
}
