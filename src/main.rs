use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use dermis_routine::{
    api::{create_router, AppState},
    config::Config,
    db::{create_pool, create_redis_client, Cache, ProductStore},
    services::{
        scorer::{ranker_from_name, Ranker},
        tokenizer::{BasicTokenizer, Tokenize, WordPieceTokenizer},
        CatalogProvider, HttpCatalogProvider, KnowledgeGraph, RoutineEngine,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let graph = KnowledgeGraph::from_file(&config.knowledge_graph_path)?;

    let store = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url)
                .await
                .context("Failed to connect to product database")?;
            ProductStore::from_postgres(&pool, &config.product_table).await?
        }
        None => ProductStore::from_csv(&config.product_store_path)?,
    };

    let tokenizer: Arc<dyn Tokenize> = match &config.tokenizer_path {
        Some(path) => Arc::new(WordPieceTokenizer::from_file(path)?),
        None => {
            tracing::warn!("TOKENIZER_PATH not set, using basic tokenizer");
            Arc::new(BasicTokenizer)
        }
    };

    let ranker = ranker_from_name(
        &config.ranker,
        config.training_epochs,
        config.learning_rate,
    )?;

    let mut catalog = HttpCatalogProvider::new(
        config.catalog_api_url.clone(),
        config.catalog_timeout(),
        config.catalog_max_retries,
    )?;

    let mut cache_handle = None;
    if let Some(redis_url) = &config.redis_url {
        let (cache, handle) = Cache::new(create_redis_client(redis_url)?);
        catalog = catalog.with_cache(cache, config.catalog_cache_ttl_secs);
        cache_handle = Some(handle);
    }

    tracing::info!(
        catalog = %config.catalog_api_url,
        provider = catalog.name(),
        tokenizer = tokenizer.name(),
        ranker = ranker.name(),
        max_len = config.max_len,
        cached = cache_handle.is_some(),
        "Routine engine configured"
    );

    let engine = RoutineEngine::new(
        Arc::new(catalog),
        Arc::new(graph),
        Arc::new(store),
        tokenizer,
        Arc::from(ranker),
        config.max_len,
    );

    let app = create_router(AppState::new(engine));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    Ok(())
}
