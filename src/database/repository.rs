// 媒体注册表仓库
//
// 被追踪媒体条目的持久化操作。封面列表以 JSON 字符串列存储，
// 解析归模型层负责。

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::{MediaItem, MediaItemRequest};

/// 数据库仓库接口
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// 分页获取媒体条目列表
    async fn get_media_list(&self, limit: i32, offset: i32) -> Result<Vec<MediaItem>>;

    /// 按 ID 获取媒体条目
    async fn get_media_by_id(&self, id: i64) -> Result<Option<MediaItem>>;

    /// 插入媒体条目，返回带数据库分配 ID 的完整行
    async fn insert_media(&self, request: &MediaItemRequest) -> Result<MediaItem>;

    /// 更新媒体条目，返回更新后的完整行
    async fn update_media(&self, id: i64, request: &MediaItemRequest) -> Result<Option<MediaItem>>;

    /// 删除媒体条目，返回是否确有删除
    async fn delete_media(&self, id: i64) -> Result<bool>;

    /// 判断媒体条目是否存在
    async fn media_exists(&self, id: i64) -> Result<bool>;

    /// 媒体条目总数
    async fn get_media_count(&self) -> Result<i64>;
}

/// SQLite 数据库仓库实现
#[derive(Clone)]
pub struct SqliteRepository {
    pool: Pool<Sqlite>,
}

impl SqliteRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// 序列化请求中的封面列表（内部方法）
    fn covers_json(request: &MediaItemRequest) -> String {
        serde_json::to_string(&request.covers).unwrap_or_else(|_| "[]".to_string())
    }
}

#[async_trait]
impl MediaRepository for SqliteRepository {
    async fn get_media_list(&self, limit: i32, offset: i32) -> Result<Vec<MediaItem>> {
        let media_items = sqlx::query_as::<_, MediaItem>(
            "SELECT * FROM media_items ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(media_items)
    }

    async fn get_media_by_id(&self, id: i64) -> Result<Option<MediaItem>> {
        let media_item = sqlx::query_as::<_, MediaItem>("SELECT * FROM media_items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(media_item)
    }

    async fn insert_media(&self, request: &MediaItemRequest) -> Result<MediaItem> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO media_items (title, year, overview, covers, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.title)
        .bind(request.year)
        .bind(&request.overview)
        .bind(Self::covers_json(request))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();

        self.get_media_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("刚插入的媒体条目不存在: id={}", id))
    }

    async fn update_media(&self, id: i64, request: &MediaItemRequest) -> Result<Option<MediaItem>> {
        let result = sqlx::query(
            r#"
            UPDATE media_items
            SET title = ?, year = ?, overview = ?, covers = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&request.title)
        .bind(request.year)
        .bind(&request.overview)
        .bind(Self::covers_json(request))
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_media_by_id(id).await
    }

    async fn delete_media(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM media_items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn media_exists(&self, id: i64) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM media_items WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    async fn get_media_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM media_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema;
    use crate::models::{CoverKind, MediaCover};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_repository() -> SqliteRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        schema::init_schema(&pool).await.unwrap();
        SqliteRepository::new(pool)
    }

    fn sample_request() -> MediaItemRequest {
        MediaItemRequest {
            title: "测试条目".to_string(),
            year: Some(2024),
            overview: Some("简介".to_string()),
            covers: vec![MediaCover::new(
                CoverKind::Poster,
                "https://example.com/poster.jpg",
            )],
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let repo = test_repository().await;

        let inserted = repo.insert_media(&sample_request()).await.unwrap();
        assert!(inserted.id > 0);
        assert_eq!(inserted.title, "测试条目");
        assert_eq!(inserted.covers().len(), 1);

        let fetched = repo.get_media_by_id(inserted.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, inserted.title);
        assert_eq!(fetched.covers(), inserted.covers());
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let repo = test_repository().await;
        assert!(repo.get_media_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_media() {
        let repo = test_repository().await;
        let inserted = repo.insert_media(&sample_request()).await.unwrap();

        let mut request = sample_request();
        request.title = "改名后的条目".to_string();
        request.covers.push(MediaCover::new(
            CoverKind::Banner,
            "https://example.com/banner.jpg",
        ));

        let updated = repo
            .update_media(inserted.id, &request)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "改名后的条目");
        assert_eq!(updated.covers().len(), 2);
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let repo = test_repository().await;
        let result = repo.update_media(999, &sample_request()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_media() {
        let repo = test_repository().await;
        let inserted = repo.insert_media(&sample_request()).await.unwrap();

        assert!(repo.delete_media(inserted.id).await.unwrap());
        assert!(!repo.media_exists(inserted.id).await.unwrap());

        // 再次删除返回 false，不报错
        assert!(!repo.delete_media(inserted.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_media_count() {
        let repo = test_repository().await;
        assert_eq!(repo.get_media_count().await.unwrap(), 0);

        repo.insert_media(&sample_request()).await.unwrap();
        repo.insert_media(&sample_request()).await.unwrap();
        assert_eq!(repo.get_media_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_list_pagination() {
        let repo = test_repository().await;
        for _ in 0..5 {
            repo.insert_media(&sample_request()).await.unwrap();
        }

        let page = repo.get_media_list(2, 0).await.unwrap();
        assert_eq!(page.len(), 2);

        let rest = repo.get_media_list(10, 4).await.unwrap();
        assert_eq!(rest.len(), 1);
    }
}
