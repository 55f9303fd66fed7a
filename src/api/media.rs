// 媒体条目管理 API
//
// 提供媒体条目的增删改查端点。写操作在落库后发布生命周期事件，
// 由封面维护工作器异步刷新/清理缓存；读操作在返回前把封面
// 重写为本地 URL。

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::database::MediaRepository;
use crate::models::{MediaItemRequest, MediaItemResponse};

use super::error::{ApiError, ApiResult};
use super::response::{paginated, success, success_message};
use super::AppState;

/// 媒体列表查询参数
#[derive(Debug, Deserialize)]
pub struct MediaListQuery {
    pub limit: Option<i32>,
    pub offset: Option<i32>,
}

/// 获取媒体条目列表
///
/// # 端点
/// GET /api/media?limit=50&offset=0
pub async fn get_media_list(
    State(state): State<AppState>,
    Query(query): Query<MediaListQuery>,
) -> ApiResult<impl IntoResponse> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let offset = query.offset.unwrap_or(0).max(0);

    let items = state
        .database
        .repository()
        .get_media_list(limit, offset)
        .await?;
    let total = state.database.repository().get_media_count().await?;

    let mut responses = Vec::with_capacity(items.len());
    for item in &items {
        let mut response = MediaItemResponse::from_item(item);
        state
            .cover_service
            .convert_to_local_urls(item.id, &mut response.covers)
            .await;
        responses.push(response);
    }

    Ok(paginated(responses, total, limit as i64, offset as i64))
}

/// 获取媒体条目详情
///
/// # 端点
/// GET /api/media/{id}
pub async fn get_media_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let item = state
        .database
        .repository()
        .get_media_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("媒体条目不存在: id={}", id)))?;

    let mut response = MediaItemResponse::from_item(&item);
    state
        .cover_service
        .convert_to_local_urls(item.id, &mut response.covers)
        .await;

    Ok(success(response))
}

/// 创建媒体条目
///
/// # 端点
/// POST /api/media
///
/// # 行为
/// 落库成功后发布条目更新事件，封面缓存异步填充。
pub async fn create_media(
    State(state): State<AppState>,
    Json(request): Json<MediaItemRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_request(&request)?;

    let item = state.database.repository().insert_media(&request).await?;

    tracing::info!("媒体条目已创建: id={}, title={}", item.id, item.title);

    // 触发封面缓存填充
    state.event_bus.publish_item_updated(item.clone());

    let mut response = MediaItemResponse::from_item(&item);
    state
        .cover_service
        .convert_to_local_urls(item.id, &mut response.covers)
        .await;

    Ok(success(response))
}

/// 更新媒体条目
///
/// # 端点
/// PUT /api/media/{id}
pub async fn update_media(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<MediaItemRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_request(&request)?;

    let item = state
        .database
        .repository()
        .update_media(id, &request)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("媒体条目不存在: id={}", id)))?;

    tracing::info!("媒体条目已更新: id={}", item.id);

    // 触发封面缓存刷新
    state.event_bus.publish_item_updated(item.clone());

    let mut response = MediaItemResponse::from_item(&item);
    state
        .cover_service
        .convert_to_local_urls(item.id, &mut response.covers)
        .await;

    Ok(success(response))
}

/// 删除媒体条目
///
/// # 端点
/// DELETE /api/media/{id}
///
/// # 行为
/// 落库删除后发布条目删除事件，封面缓存目录被异步递归清理。
pub async fn delete_media(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let deleted = state.database.repository().delete_media(id).await?;

    if !deleted {
        return Err(ApiError::NotFound(format!("媒体条目不存在: id={}", id)));
    }

    tracing::info!("媒体条目已删除: id={}", id);

    // 触发封面缓存清理
    state.event_bus.publish_item_deleted(id);

    Ok(success_message("媒体条目已删除"))
}

/// 校验请求体（内部方法）
fn validate_request(request: &MediaItemRequest) -> Result<(), ApiError> {
    if request.title.trim().is_empty() {
        return Err(ApiError::Validation("标题不能为空".to_string()));
    }

    for cover in &request.covers {
        if cover.remote_url.trim().is_empty() {
            return Err(ApiError::Validation(format!(
                "封面远程 URL 不能为空: kind={}",
                cover.kind.as_str()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CoverKind, MediaCover};

    fn request_with_cover(url: &str) -> MediaItemRequest {
        MediaItemRequest {
            title: "测试条目".to_string(),
            year: None,
            overview: None,
            covers: vec![MediaCover::new(CoverKind::Poster, url)],
        }
    }

    #[test]
    fn test_validate_empty_title() {
        let request = MediaItemRequest {
            title: "   ".to_string(),
            year: None,
            overview: None,
            covers: vec![],
        };

        assert!(matches!(
            validate_request(&request),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_empty_cover_url() {
        let request = request_with_cover("");
        assert!(matches!(
            validate_request(&request),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_ok() {
        let request = request_with_cover("https://example.com/poster.jpg");
        assert!(validate_request(&request).is_ok());
    }
}
