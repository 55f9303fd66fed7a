// 数据库 schema 管理
//
// 媒体注册表只有一张表，启动时直接创建并验证，不走迁移目录。

use anyhow::Result;
use sqlx::{Pool, Sqlite};

/// 初始化数据库 schema
pub async fn init_schema(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS media_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            year INTEGER,
            overview TEXT,
            covers TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_media_title ON media_items (title)")
        .execute(pool)
        .await?;

    Ok(())
}

/// 验证数据库 schema 完整性
pub async fn verify_schema(pool: &Pool<Sqlite>) -> Result<()> {
    // 检查必需的表是否存在
    let exists = sqlx::query("SELECT name FROM sqlite_master WHERE type='table' AND name=?")
        .bind("media_items")
        .fetch_optional(pool)
        .await?;

    if exists.is_none() {
        return Err(anyhow::anyhow!("Required table 'media_items' does not exist"));
    }

    // 检查关键索引是否存在
    let index = sqlx::query("SELECT name FROM sqlite_master WHERE type='index' AND name=?")
        .bind("idx_media_title")
        .fetch_optional(pool)
        .await?;

    if index.is_none() {
        return Err(anyhow::anyhow!("Required index 'idx_media_title' does not exist"));
    }

    tracing::info!("Database schema verification completed successfully");
    Ok(())
}

/// 获取数据库统计信息
pub async fn get_database_stats(pool: &Pool<Sqlite>) -> Result<DatabaseStats> {
    let media_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM media_items")
        .fetch_one(pool)
        .await?;

    // 获取数据库文件大小
    let db_size: i64 = sqlx::query_scalar(
        "SELECT page_count * page_size as size FROM pragma_page_count(), pragma_page_size()",
    )
    .fetch_one(pool)
    .await?;

    Ok(DatabaseStats {
        media_count,
        database_size_bytes: db_size,
    })
}

/// 数据库统计信息
#[derive(Debug)]
pub struct DatabaseStats {
    pub media_count: i64,
    pub database_size_bytes: i64,
}

impl DatabaseStats {
    pub fn database_size_mb(&self) -> f64 {
        self.database_size_bytes as f64 / (1024.0 * 1024.0)
    }
}
