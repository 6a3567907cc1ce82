use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bifrost_server::config::Config;
use bifrost_server::{graphql, routes};
use plebiscite_client::PlebisciteClient;
use psychonaut_client::PsychonautClient;

#[derive(Parser)]
#[command(name = "bifrost", about = "GraphQL gateway over the PsychonautWiki API")]
struct Cli {
    /// Log filter, e.g. `info` or `bifrost_server=debug`
    #[arg(long)]
    log_level: Option<String>,

    /// Listening port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Log upstream requests at debug level
    #[arg(long)]
    debug_requests: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    let mut filter = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.log_level.clone());
    if cli.debug_requests {
        filter.push_str(",psychonaut_client=debug");
    }
    let env_filter = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    tracing::info!(cache_ttl_ms = config.cache_ttl_ms, "Starting bifrost");

    let client = Arc::new(PsychonautClient::new(Duration::from_millis(
        config.cache_ttl_ms,
    )));

    let plebiscite = match &config.plebiscite {
        Some(settings) => Some(Arc::new(
            PlebisciteClient::new(
                &settings.mongo_url,
                &settings.mongo_db,
                &settings.mongo_collection,
            )
            .await
            .context("failed to set up the Plebiscite store")?,
        )),
        None => None,
    };
    if plebiscite.is_some() {
        tracing::info!("Plebiscite enabled, erowid query available");
    }

    let schema = graphql::build_schema(client, plebiscite);
    let app = routes::build_router(schema);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(addr = %addr, "GraphQL endpoint ready");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
