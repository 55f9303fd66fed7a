use axum::{extract::State, response::IntoResponse};
use serde_json::json;

use crate::database::MediaRepository;

use super::error::{ApiError, ApiResult};
use super::response::success;
use super::AppState;

/// 健康检查端点
pub async fn health_check(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    // 检查数据库连接
    state.database.verify_integrity().await.map_err(|e| {
        tracing::error!("Health check failed: {}", e);
        ApiError::Internal("Database connection failed".to_string())
    })?;

    Ok(success(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": "1.0.0",
        "database": "connected"
    })))
}

/// 获取系统统计信息
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let media_count = state
        .database
        .repository()
        .get_media_count()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to get media count: {}", e)))?;

    let db_stats = state
        .database
        .get_stats()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to get database stats: {}", e)))?;

    let cover_stats = state
        .cover_service
        .get_cache_stats()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to get cover cache stats: {}", e)))?;

    Ok(success(json!({
        "media_count": media_count,
        "database_size_mb": db_stats.database_size_mb(),
        "cover_cache": {
            "total_size": cover_stats.total_size,
            "total_files": cover_stats.total_files,
            "item_count": cover_stats.item_count
        },
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
