// 封面下载器 - 将远程图片取到本地路径
//
// 本模块提供封面原图的下载能力，包括：
// - 超时控制
// - 失败重试
// - 失败分类（不向上层抛未分类错误）
//
// 下载是网络密集型操作，不受缩放闸门限制。

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::fs;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::services::covers::error::{CoverCacheError, DownloadError};

/// 单次下载超时
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// 最大尝试次数（1 次初始 + 2 次重试）
const MAX_ATTEMPTS: u32 = 3;

/// 重试间隔
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// 封面下载能力
///
/// 薄契约：把 `url` 的内容取到 `dest` 路径。所有失败都以
/// `DownloadError` 分类返回，调用方按封面隔离处理。
#[async_trait]
pub trait CoverFetcher: Send + Sync {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), DownloadError>;
}

/// 基于 HTTP 的封面下载器
///
/// 生产实现，带连接池、超时与重试。
pub struct HttpCoverFetcher {
    /// HTTP 客户端（连接池复用）
    client: Client,
}

impl HttpCoverFetcher {
    /// 创建新的下载器
    ///
    /// # 返回
    /// - `Result<Self, CoverCacheError>`: 下载器实例或错误
    pub fn new() -> Result<Self, CoverCacheError> {
        let client = Client::builder()
            .pool_max_idle_per_host(10) // 每个主机最多保持 10 个空闲连接
            .pool_idle_timeout(Duration::from_secs(90)) // 空闲连接超时 90 秒
            .build()
            .map_err(|e| CoverCacheError::Config(format!("创建 HTTP 客户端失败: {}", e)))?;

        Ok(Self { client })
    }

    /// 执行一次下载并写入目标路径（内部方法）
    async fn fetch_once(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        // 1. 下载图片（带超时）
        let bytes = match timeout(DOWNLOAD_TIMEOUT, self.download_bytes(url)).await {
            Ok(result) => result?,
            Err(_) => return Err(DownloadError::Timeout),
        };

        // 2. 确保父目录存在
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::WriteFailed(format!("创建目录失败: {}", e)))?;
        }

        // 3. 写入本地文件
        fs::write(dest, &bytes)
            .await
            .map_err(|e| DownloadError::WriteFailed(format!("写入文件失败: {}", e)))?;

        debug!("封面已保存: {:?} ({} 字节)", dest, bytes.len());
        Ok(())
    }

    /// 下载图片字节（内部方法）
    async fn download_bytes(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        // 发送 GET 请求
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(DownloadError::from)?;

        // 检查 HTTP 状态码
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::HttpError(status.as_u16()));
        }

        // 读取响应体
        let bytes = response.bytes().await.map_err(DownloadError::from)?;

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl CoverFetcher for HttpCoverFetcher {
    /// 下载封面到本地路径
    ///
    /// # 参数
    /// - `url`: 远程图片 URL
    /// - `dest`: 本地目标路径
    ///
    /// # 超时
    /// - 单次下载超时：30 秒
    ///
    /// # 重试
    /// - 最多重试 2 次，间隔 1 秒
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        // URL 预校验，格式错误不值得走网络重试
        if let Err(e) = url::Url::parse(url) {
            return Err(DownloadError::InvalidUrl(format!("{}: {}", url, e)));
        }

        debug!("开始下载封面: {} -> {:?}", url, dest);

        let mut last_error = None;

        for attempt in 1..=MAX_ATTEMPTS {
            match self.fetch_once(url, dest).await {
                Ok(()) => {
                    info!(
                        "封面下载成功: {} -> {:?} (尝试 {}/{})",
                        url, dest, attempt, MAX_ATTEMPTS
                    );
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        "封面下载失败 (尝试 {}/{}): {} - 错误: {:?}",
                        attempt, MAX_ATTEMPTS, url, e
                    );
                    last_error = Some(e);

                    // 如果不是最后一次尝试，等待后重试
                    if attempt < MAX_ATTEMPTS {
                        tokio::time::sleep(RETRY_DELAY).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| DownloadError::NetworkError("未知错误".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_new_fetcher() {
        assert!(HttpCoverFetcher::new().is_ok());
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_fails_fast() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = HttpCoverFetcher::new().unwrap();

        let start = std::time::Instant::now();
        let result = fetcher
            .fetch("not a url", &temp_dir.path().join("poster.jpg"))
            .await;

        // 格式错误不触发重试，应立即返回
        assert!(matches!(result, Err(DownloadError::InvalidUrl(_))));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = HttpCoverFetcher::new().unwrap();

        let result = fetcher
            .fetch(
                "https://invalid-domain-that-does-not-exist-12345.com/image.jpg",
                &temp_dir.path().join("poster.jpg"),
            )
            .await;

        assert!(result.is_err());
        // 应该是网络错误或超时，且目标文件不应产生
        match result.unwrap_err() {
            DownloadError::NetworkError(_) | DownloadError::Timeout => {}
            e => panic!("期望网络错误或超时，得到: {:?}", e),
        }
        assert!(!temp_dir.path().join("poster.jpg").exists());
    }
}
