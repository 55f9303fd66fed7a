// 封面缓存 API
//
// 提供封面缓存的 HTTP 端点，包括：
// - 缓存文件服务（原图与缩放变体）
// - 手动刷新 / 清理
// - 缓存统计与配置管理

use std::sync::OnceLock;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use regex::Regex;
use tokio_util::io::ReaderStream;

use crate::database::MediaRepository;
use crate::services::covers::CoverCacheConfig;

use super::error::{ApiError, ApiResult};
use super::response::{success, success_message};
use super::AppState;

/// 校验封面文件名（内部方法）
///
/// 合法格式：`poster.jpg`、`poster-250.jpg` 这样的
/// 小写类别名加可选高度后缀，拒绝一切路径穿越的可能。
fn is_valid_cover_filename(filename: &str) -> bool {
    static FILENAME_REGEX: OnceLock<Regex> = OnceLock::new();

    let regex = FILENAME_REGEX.get_or_init(|| {
        Regex::new(r"^[a-z]+(-\d+)?\.jpg$").expect("封面文件名正则表达式编译失败")
    });

    regex.is_match(filename)
}

/// 封面缓存文件服务
///
/// # 端点
/// GET /MediaCover/{item_id}/{filename}
///
/// # 行为
/// 直接从缓存目录流式返回文件；文件不存在返回 404，
/// 消费方自行回落（原图、远程或占位图）。
pub async fn serve_cover(
    State(state): State<AppState>,
    Path((item_id, filename)): Path<(i64, String)>,
) -> Result<Response, StatusCode> {
    if !is_valid_cover_filename(&filename) {
        return Err(StatusCode::BAD_REQUEST);
    }

    let path = state.cover_service.paths().item_dir(item_id).join(&filename);

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(_) => return Err(StatusCode::NOT_FOUND),
    };

    let file_size = file
        .metadata()
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .len();

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg".to_string()),
            (header::CONTENT_LENGTH, file_size.to_string()),
        ],
        body,
    )
        .into_response())
}

/// 手动刷新一个条目的封面缓存
///
/// # 端点
/// POST /api/media/{id}/covers/refresh
///
/// # 行为
/// 重新发布条目更新事件，缓存由维护工作器异步刷新。
pub async fn refresh_covers(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let item = state
        .database
        .repository()
        .get_media_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("媒体条目不存在: id={}", id)))?;

    tracing::info!("手动刷新封面缓存: item_id={}", id);
    state.event_bus.publish_item_updated(item);

    Ok(success_message("封面缓存刷新已触发"))
}

/// 清理一个条目的封面缓存
///
/// # 端点
/// DELETE /api/media/{id}/covers
pub async fn purge_covers(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    state.cover_service.purge_item(id).await.map_err(|e| {
        tracing::error!("清理封面缓存失败: item_id={}, error={}", id, e);
        ApiError::Internal(format!("清理封面缓存失败: {}", e))
    })?;

    Ok(success_message("封面缓存已清理"))
}

/// 获取封面缓存统计
///
/// # 端点
/// GET /api/covers/stats
pub async fn get_cover_cache_stats(
    State(state): State<AppState>,
) -> ApiResult<impl IntoResponse> {
    let stats = state.cover_service.get_cache_stats().await.map_err(|e| {
        tracing::error!("获取封面缓存统计失败: {}", e);
        ApiError::Internal(format!("获取封面缓存统计失败: {}", e))
    })?;

    Ok(success(stats))
}

/// 获取封面缓存配置
///
/// # 端点
/// GET /api/covers/config
pub async fn get_cover_config(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let config = state.config_manager.get_config().await;
    Ok(success(config))
}

/// 更新封面缓存配置
///
/// # 端点
/// PUT /api/covers/config
///
/// # 行为
/// 配置持久化到 JSON 文件。URL 前缀立即对后续请求生效；
/// 缓存目录与并发上限在服务重启后生效。
pub async fn update_cover_config(
    State(state): State<AppState>,
    Json(config): Json<CoverCacheConfig>,
) -> ApiResult<impl IntoResponse> {
    if config.url_base.trim().is_empty() {
        return Err(ApiError::Validation("URL 前缀不能为空".to_string()));
    }

    state
        .config_manager
        .update_config(config.clone())
        .await
        .map_err(|e| {
            tracing::error!("更新封面缓存配置失败: {}", e);
            ApiError::Internal(format!("更新封面缓存配置失败: {}", e))
        })?;

    tracing::info!("封面缓存配置更新成功");

    Ok(success(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_cover_filenames() {
        assert!(is_valid_cover_filename("poster.jpg"));
        assert!(is_valid_cover_filename("poster-500.jpg"));
        assert!(is_valid_cover_filename("banner-35.jpg"));
        assert!(is_valid_cover_filename("fanart-360.jpg"));
    }

    #[test]
    fn test_invalid_cover_filenames() {
        // 路径穿越
        assert!(!is_valid_cover_filename("../secret.jpg"));
        assert!(!is_valid_cover_filename("..%2fsecret.jpg"));
        // 错误扩展名
        assert!(!is_valid_cover_filename("poster.png"));
        assert!(!is_valid_cover_filename("poster.jpg.exe"));
        // 大写与空串
        assert!(!is_valid_cover_filename("Poster.jpg"));
        assert!(!is_valid_cover_filename(""));
        // 缺少类别名
        assert!(!is_valid_cover_filename("-500.jpg"));
    }
}
