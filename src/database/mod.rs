use std::str::FromStr;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

pub mod repository;
pub mod schema;

pub use repository::{MediaRepository, SqliteRepository};

#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
    repository: SqliteRepository,
}

impl Database {
    pub async fn new() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./media_cover.db?mode=rwc".to_string());

        tracing::info!("Connecting to database: {}", database_url);

        // 配置 SQLite 连接选项
        let connect_options = SqliteConnectOptions::from_str(&database_url)?
            .busy_timeout(std::time::Duration::from_secs(30)); // 设置忙等待超时

        // SQLite 单写入者，限制为1个连接以避免锁定问题
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await?;

        // 建表并验证
        tracing::info!("Initializing database schema...");
        schema::init_schema(&pool).await?;
        schema::verify_schema(&pool).await?;

        let stats = schema::get_database_stats(&pool).await?;
        tracing::info!(
            "Database initialized - Media: {}, Size: {:.2} MB",
            stats.media_count,
            stats.database_size_mb()
        );

        let repository = SqliteRepository::new(pool.clone());

        Ok(Self { pool, repository })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub fn repository(&self) -> &SqliteRepository {
        &self.repository
    }

    /// 获取数据库统计信息
    pub async fn get_stats(&self) -> Result<schema::DatabaseStats> {
        schema::get_database_stats(&self.pool).await
    }

    /// 验证数据库完整性
    pub async fn verify_integrity(&self) -> Result<()> {
        schema::verify_schema(&self.pool).await
    }
}
