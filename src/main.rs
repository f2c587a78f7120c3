mod config;
mod handlers;
mod models;
mod server;
mod services;

use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;

use config::Config;
use handlers::IngredientDetector;
use server::create_router;
use services::{GoogleVisionClient, LabelSource};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Load environment variables
    dotenv().ok();

    log::info!("🚀 Starting Food Vision Service...");

    let config = Config::from_env()?;

    let vision = Arc::new(GoogleVisionClient::new(
        config.vision_api_url.clone(),
        config.vision_api_key.clone(),
        config.vision_max_results,
        config.vision_timeout,
    )?);
    log::info!(
        "✅ Vision client initialized: {} (timeout {:?})",
        config.vision_api_url,
        config.vision_timeout
    );

    let detector = Arc::new(IngredientDetector::new(vision as Arc<dyn LabelSource>));
    let app = create_router(detector);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("🌐 Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("🛑 Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("❌ Failed to listen for shutdown signal: {}", e);
    }
}
