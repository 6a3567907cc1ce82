pub mod effects;
pub mod erowid;
pub mod error;
pub mod experiences;
pub mod substances;

use std::sync::Arc;

use async_graphql::{EmptyMutation, EmptySubscription, MergedObject, Request, Response, Schema};

use plebiscite_client::PlebisciteClient;
use psychonaut_client::PsychonautClient;

/// Query root without the optional Plebiscite-backed query.
#[derive(MergedObject, Default)]
pub struct QueryRoot(
    substances::SubstanceQuery,
    effects::EffectQuery,
    experiences::ExperienceQuery,
);

/// Query root with the Plebiscite-backed erowid query merged in.
#[derive(MergedObject, Default)]
pub struct PlebisciteQueryRoot(
    substances::SubstanceQuery,
    effects::EffectQuery,
    experiences::ExperienceQuery,
    erowid::ErowidQuery,
);

pub type CoreSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;
pub type PlebisciteSchema = Schema<PlebisciteQueryRoot, EmptyMutation, EmptySubscription>;

/// The erowid query only exists in the schema when Plebiscite is
/// configured; selecting it otherwise fails at validation, not at runtime.
#[derive(Clone)]
pub enum BifrostSchema {
    Core(CoreSchema),
    Plebiscite(PlebisciteSchema),
}

impl BifrostSchema {
    pub async fn execute(&self, request: impl Into<Request>) -> Response {
        match self {
            BifrostSchema::Core(schema) => schema.execute(request).await,
            BifrostSchema::Plebiscite(schema) => schema.execute(request).await,
        }
    }

    pub fn sdl(&self) -> String {
        match self {
            BifrostSchema::Core(schema) => schema.sdl(),
            BifrostSchema::Plebiscite(schema) => schema.sdl(),
        }
    }
}

pub fn build_schema(
    client: Arc<PsychonautClient>,
    plebiscite: Option<Arc<PlebisciteClient>>,
) -> BifrostSchema {
    match plebiscite {
        Some(store) => BifrostSchema::Plebiscite(
            Schema::build(
                PlebisciteQueryRoot::default(),
                EmptyMutation,
                EmptySubscription,
            )
            .data(client)
            .data(store)
            .limit_depth(10)
            .limit_complexity(1000)
            .finish(),
        ),
        None => BifrostSchema::Core(
            Schema::build(QueryRoot::default(), EmptyMutation, EmptySubscription)
                .data(client)
                .limit_depth(10)
                .limit_complexity(1000)
                .finish(),
        ),
    }
}
