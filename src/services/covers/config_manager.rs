// 配置管理器 - 管理封面缓存配置的读写和更新
//
// 本模块提供封面缓存配置的持久化管理功能，包括：
// - 从 JSON 文件加载配置
// - 保存配置到 JSON 文件
// - 线程安全的读取与更新

use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tokio::sync::RwLock;

use crate::services::covers::config::CoverCacheConfig;
use crate::services::covers::error::CoverCacheError;

/// 配置管理器
///
/// 负责封面缓存配置的读写和更新，使用 Arc<RwLock> 保证线程安全
pub struct ConfigManager {
    /// 配置文件路径
    config_path: PathBuf,

    /// 封面缓存配置（使用读写锁保证线程安全）
    config: Arc<RwLock<CoverCacheConfig>>,
}

impl ConfigManager {
    /// 默认配置文件路径
    const DEFAULT_CONFIG_PATH: &'static str = "cover_cache_config.json";

    /// 从配置文件加载配置
    ///
    /// # 参数
    /// - `config_path`: 可选的配置文件路径，如果为 None 则使用默认路径
    ///
    /// # 行为
    /// - 如果配置文件不存在，使用默认配置并创建文件
    /// - 如果配置文件损坏，使用默认配置并备份旧文件
    pub async fn load(config_path: Option<PathBuf>) -> Result<Self, CoverCacheError> {
        let config_path =
            config_path.unwrap_or_else(|| PathBuf::from(Self::DEFAULT_CONFIG_PATH));

        let config = if config_path.exists() {
            match fs::read_to_string(&config_path).await {
                Ok(content) => match serde_json::from_str::<CoverCacheConfig>(&content) {
                    Ok(config) => {
                        tracing::info!("成功加载封面缓存配置: {:?}", config_path);
                        config
                    }
                    Err(e) => {
                        // 配置文件损坏，备份并使用默认配置
                        tracing::warn!("配置文件损坏，使用默认配置: {}", e);
                        Self::backup_corrupted_config(&config_path).await?;
                        CoverCacheConfig::default()
                    }
                },
                Err(e) => {
                    tracing::warn!("读取配置文件失败，使用默认配置: {}", e);
                    CoverCacheConfig::default()
                }
            }
        } else {
            tracing::info!("配置文件不存在，使用默认配置");
            CoverCacheConfig::default()
        };

        let manager = Self {
            config_path,
            config: Arc::new(RwLock::new(config)),
        };

        // 保存默认配置到文件
        if !manager.config_path.exists() {
            manager.save().await?;
        }

        Ok(manager)
    }

    /// 保存配置到文件
    pub async fn save(&self) -> Result<(), CoverCacheError> {
        let config = self.config.read().await;

        // 序列化配置为 JSON（格式化输出）
        let json = serde_json::to_string_pretty(&*config)?;

        // 确保父目录存在
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| CoverCacheError::Config(format!("创建配置目录失败: {}", e)))?;
            }
        }

        // 写入文件
        fs::write(&self.config_path, json)
            .await
            .map_err(|e| CoverCacheError::Config(format!("写入配置文件失败: {}", e)))?;

        tracing::info!("成功保存封面缓存配置: {:?}", self.config_path);
        Ok(())
    }

    /// 获取当前配置的副本
    pub async fn get_config(&self) -> CoverCacheConfig {
        self.config.read().await.clone()
    }

    /// 更新配置并持久化
    ///
    /// # 参数
    /// - `new_config`: 新的完整配置
    ///
    /// # 行为
    /// 注意：缩放闸门容量在服务构造时确定，更新 `resize_concurrency`
    /// 只对之后构造的服务实例生效。
    pub async fn update_config(
        &self,
        new_config: CoverCacheConfig,
    ) -> Result<(), CoverCacheError> {
        {
            let mut config = self.config.write().await;
            *config = new_config;
        }

        self.save().await
    }

    /// 备份损坏的配置文件（内部方法）
    async fn backup_corrupted_config(config_path: &PathBuf) -> Result<(), CoverCacheError> {
        let backup_path = config_path.with_extension(format!(
            "json.corrupted.{}",
            chrono::Utc::now().format("%Y%m%d%H%M%S")
        ));

        fs::rename(config_path, &backup_path)
            .await
            .map_err(|e| CoverCacheError::Config(format!("备份损坏配置失败: {}", e)))?;

        tracing::warn!("已备份损坏的配置文件: {:?}", backup_path);
        Ok(())
    }
}
