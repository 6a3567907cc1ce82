//! Export the GraphQL schema as SDL.
//!
//! Usage: cargo run --bin export-schema [output_path]

use std::sync::Arc;
use std::time::Duration;

use bifrost_server::graphql;
use psychonaut_client::PsychonautClient;

fn main() {
    let client = Arc::new(PsychonautClient::new(Duration::from_secs(0)));
    let schema = graphql::build_schema(client, None);
    let sdl = schema.sdl();

    let out_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "schema.graphql".to_string());

    std::fs::write(&out_path, &sdl).expect("Failed to write schema file");
    eprintln!("Schema exported to {out_path} ({} bytes)", sdl.len());
}
