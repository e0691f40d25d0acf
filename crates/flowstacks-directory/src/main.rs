mod cache;
mod catalog;
mod config;
mod discovery;
mod error;
mod leaderboard;
mod matcher;
mod model;
mod palette;
mod query;
mod ranking;
mod recommend;
mod reviews;
mod server;
mod stacks;
mod summary;

use std::path::Path;
use std::sync::Arc;

use flowstacks_common::redis::RedisCache;
use flowstacks_common::web_search::WebSearchClient;
use rmcp::{ServiceExt, transport::stdio};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cache::SearchCache;
use catalog::Catalog;
use config::Config;
use discovery::DiscoveryService;
use reviews::ReviewStore;
use server::FlowStacksServer;
use stacks::StackStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting flowstacks-directory MCP server");

    let config = Config::from_env()?;
    info!(
        data_dir = %config.data_dir,
        redis = config.redis_url.is_some(),
        search_provider = config.search.default_provider.as_str(),
        "configuration loaded"
    );

    let redis = RedisCache::new(config.redis_url.as_deref());
    if !redis.is_configured() {
        info!("REDIS_URL not set, reviews and stacks will not persist");
    } else if redis.is_available().await {
        info!("redis connected");
    } else {
        warn!("redis unreachable, reviews and stacks will not persist");
    }

    let catalog = Catalog::load(&config.tools_file_path(), &config.collections_file_path())?;
    for (collection, slug) in catalog.dangling_collection_refs() {
        warn!(collection = %collection, tool_slug = %slug, "collection references unknown tool");
    }
    info!(
        tools = catalog.tools().len(),
        collections = catalog.collections().len(),
        "catalog loaded"
    );

    let seed = match config.reviews_seed.as_deref() {
        Some(path) => ReviewStore::load_seed(Path::new(path))?,
        None => Vec::new(),
    };
    let reviews = ReviewStore::new(redis.clone(), seed);
    info!(seed_reviews = reviews.seed_len(), "review store ready");

    let search_cache = SearchCache::new(redis.clone());
    if config.clear_search_cache {
        let cleared = search_cache.invalidate_all().await;
        info!(cleared, "search cache cleared");
    }
    let client = WebSearchClient::new(config.search.clone())?;
    let discovery = DiscoveryService::new(client, search_cache);
    info!(provider = discovery.default_provider().as_str(), "web search ready");

    let server = FlowStacksServer::new(
        Arc::new(catalog),
        reviews,
        StackStore::new(redis),
        discovery,
    );

    if let Ok(addr) = std::env::var("MCP_TCP_LISTEN_ADDR") {
        let listener = TcpListener::bind(&addr).await?;
        info!(listen_addr = %addr, "MCP server ready, serving on TCP");
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = server.clone();
            tokio::spawn(async move {
                tracing::info!(peer = %peer, "MCP client connected");
                let service = server.serve(stream).await.inspect_err(|e| {
                    tracing::error!(error = %e, "MCP server error");
                })?;
                service.waiting().await?;
                tracing::info!(peer = %peer, "MCP client disconnected");
                Ok::<(), anyhow::Error>(())
            });
        }
    } else {
        info!("MCP server ready, serving on stdio");
        let service = server.serve(stdio()).await.inspect_err(|e| {
            tracing::error!(error = %e, "MCP server error");
        })?;
        service.waiting().await?;
        info!("MCP server shut down");
    }
    Ok(())
}
