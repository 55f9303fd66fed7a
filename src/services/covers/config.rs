// 封面缓存配置数据结构
//
// 定义了封面缓存的核心配置，包括：
// - 对外服务的 URL 前缀
// - 缓存根目录
// - 可选的缩放并发上限

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// 封面缓存配置（存储在 cover_cache_config.json）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoverCacheConfig {
    /// 对外服务的 URL 前缀（如 "http://localhost:3000"）
    ///
    /// 本地封面 URL 形如 `<url_base>/MediaCover/{item_id}/poster.jpg`。
    pub url_base: String,

    /// 缓存根目录
    pub cache_dir: PathBuf,

    /// 缩放并发上限
    ///
    /// None 表示按可用计算核数自动推导（核数的一半向上取整，最少 1）。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resize_concurrency: Option<usize>,
}

impl Default for CoverCacheConfig {
    /// 默认配置：本机地址 + 工作目录下的 covers 目录，自动推导并发
    fn default() -> Self {
        Self {
            url_base: "http://localhost:3000".to_string(),
            cache_dir: PathBuf::from("covers"),
            resize_concurrency: None,
        }
    }
}

impl CoverCacheConfig {
    /// 计算缩放闸门容量
    ///
    /// # 规则
    /// 1. 配置中显式给出时用配置值（最少 1）
    /// 2. 否则取可用计算核数的一半，向上取整，最少 1
    pub fn resize_gate_capacity(&self) -> usize {
        if let Some(n) = self.resize_concurrency {
            return n.max(1);
        }

        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(2);
        cores.div_ceil(2).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CoverCacheConfig::default();
        assert_eq!(config.url_base, "http://localhost:3000");
        assert_eq!(config.cache_dir, PathBuf::from("covers"));
        assert!(config.resize_concurrency.is_none());
    }

    #[test]
    fn test_explicit_resize_concurrency() {
        let config = CoverCacheConfig {
            resize_concurrency: Some(3),
            ..Default::default()
        };
        assert_eq!(config.resize_gate_capacity(), 3);

        // 配置为 0 时仍至少为 1
        let config = CoverCacheConfig {
            resize_concurrency: Some(0),
            ..Default::default()
        };
        assert_eq!(config.resize_gate_capacity(), 1);
    }

    #[test]
    fn test_derived_resize_concurrency_at_least_one() {
        let config = CoverCacheConfig::default();
        assert!(config.resize_gate_capacity() >= 1);
    }

    #[test]
    fn test_config_serialization() {
        let config = CoverCacheConfig {
            url_base: "http://media.local".to_string(),
            cache_dir: PathBuf::from("/var/cache/covers"),
            resize_concurrency: Some(2),
        };

        // 测试序列化
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("url_base"));
        assert!(json.contains("resize_concurrency"));

        // 测试反序列化
        let deserialized: CoverCacheConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_config_deserialization_without_concurrency() {
        let json = r#"{"url_base":"http://media.local","cache_dir":"covers"}"#;
        let config: CoverCacheConfig = serde_json::from_str(json).unwrap();
        assert!(config.resize_concurrency.is_none());
    }
}
