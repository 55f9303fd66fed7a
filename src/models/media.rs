// 媒体条目模型
//
// 被追踪的媒体条目是封面缓存的所有者：条目更新触发缓存刷新，
// 条目删除触发缓存清理。封面列表以 JSON 字符串形式存储在数据库中。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::cover::MediaCover;

/// 媒体条目 ID（正整数，决定缓存子目录）
pub type MediaId = i64;

/// 媒体条目（数据库行）
#[derive(Debug, Clone, FromRow)]
pub struct MediaItem {
    pub id: MediaId,
    pub title: String,
    pub year: Option<i32>,
    pub overview: Option<String>,
    pub covers: String, // JSON array as string - 封面描述符列表
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaItem {
    /// 解析封面列表
    ///
    /// 数据库中的 `covers` 列是 JSON 数组字符串；解析失败时返回空列表，
    /// 与缺失封面等价处理。
    pub fn covers(&self) -> Vec<MediaCover> {
        serde_json::from_str(&self.covers).unwrap_or_default()
    }

    /// 序列化封面列表写回 `covers` 列
    pub fn set_covers(&mut self, covers: &[MediaCover]) {
        self.covers = serde_json::to_string(covers).unwrap_or_else(|_| "[]".to_string());
    }
}

/// 创建/更新媒体条目的请求体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItemRequest {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,

    /// 封面描述符列表（只需 kind 与 remote_url）
    #[serde(default)]
    pub covers: Vec<MediaCover>,
}

/// 媒体条目响应体（封面经过本地 URL 重写后返回）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItemResponse {
    pub id: MediaId,
    pub title: String,
    pub year: Option<i32>,
    pub overview: Option<String>,
    pub covers: Vec<MediaCover>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MediaItemResponse {
    /// 从数据库行构造响应体
    ///
    /// 此时封面的 local_url 尚未填充，由封面缓存服务在序列化前重写。
    pub fn from_item(item: &MediaItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            year: item.year,
            overview: item.overview.clone(),
            covers: item.covers(),
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}
