use std::sync::Arc;

use tokio::signal;

mod api;
mod config;
#[cfg(test)]
mod testutil;

use api::AppState;
use sentsim_core::embedding::openai::OpenAiEmbedder;
use sentsim_core::service::SentenceService;
use sentsim_core::store::SentenceStore;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = config::load().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let addr = config.bind_address();
    let embedder = OpenAiEmbedder::new(&config.provider).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    let store = SentenceStore::new(&config.storage.path);

    let state = Arc::new(AppState {
        service: SentenceService::new(embedder, store),
    });
    let app = api::router(state, &config.frontend.index);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: failed to bind to {addr}: {e}");
            std::process::exit(1);
        });

    println!("sentsim server started");
    println!("  address:  http://{addr}");
    println!("  endpoint: {}", config.provider.endpoint);
    println!("  model:    {}", config.provider.model);
    println!("  storage:  {}", config.storage.path);
    log::info!("listening on {addr}");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        log::error!("server error: {e}");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        log::error!("failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("received Ctrl+C, shutting down");
}
