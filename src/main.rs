// 允许未使用的代码（对外 API 项从库入口使用）
#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;

mod api;
mod database;
mod events;
mod models;
mod services;

use events::{CoverMaintenanceWorker, EventBus};
use services::covers::{ConfigManager, CoverCacheService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize database
    let database = database::Database::new().await?;

    // Load cover cache configuration
    let config_path = std::env::var("COVER_CONFIG_PATH").ok().map(PathBuf::from);
    let config_manager = Arc::new(ConfigManager::load(config_path).await?);
    let cover_config = config_manager.get_config().await;

    // Initialize cover cache service
    let cover_service = Arc::new(CoverCacheService::new(&cover_config).await?);

    // Start cover maintenance worker
    let event_bus = EventBus::new();
    let worker = CoverMaintenanceWorker::new(event_bus.clone(), cover_service.clone());
    tokio::spawn(worker.run());

    // Build our application with routes
    let app = Router::new()
        .route("/", get(|| async { "Media Cover Backend API v1.0" }))
        // Health and stats
        .route("/api/health", get(api::health::health_check))
        .route("/api/stats", get(api::health::get_stats))
        // Media management
        .route("/api/media", get(api::media::get_media_list))
        .route("/api/media", post(api::media::create_media))
        .route("/api/media/:id", get(api::media::get_media_detail))
        .route("/api/media/:id", put(api::media::update_media))
        .route("/api/media/:id", delete(api::media::delete_media))
        // Cover cache management
        .route("/api/media/:id/covers/refresh", post(api::covers::refresh_covers))
        .route("/api/media/:id/covers", delete(api::covers::purge_covers))
        .route("/api/covers/stats", get(api::covers::get_cover_cache_stats))
        .route("/api/covers/config", get(api::covers::get_cover_config))
        .route("/api/covers/config", put(api::covers::update_cover_config))
        // Cover file serving
        .route("/MediaCover/:item_id/:filename", get(api::covers::serve_cover))
        .layer(CorsLayer::permissive())
        .with_state(api::AppState {
            database: database.clone(),
            cover_service,
            config_manager,
            event_bus,
        });

    // Run the server - 从环境变量读取配置
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("🚀 Server listening on {}", addr);
    tracing::info!("🖼️ Cover maintenance worker started");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
