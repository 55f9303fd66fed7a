// 封面缓存服务 - 协调下载、缩放与清理，提供统一的缓存管理接口
//
// 本模块是封面缓存功能的核心服务，负责：
// - 条目更新时按封面刷新缓存（下载原图 + 派生缩放变体）
// - 条目删除时递归清理缓存目录
// - 把封面的远程 URL 重写为带缓存破坏参数的本地 URL
// - 提供缓存统计
//
// 并发模型：下载不受限制（网络密集、低 CPU）；所有条目的缩放工作
// 共享一个进程级的有界闸门，防止无限并行的图片变换拖垮宿主机。

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::models::{CoverKind, MediaCover, MediaId, MediaItem};
use crate::services::covers::config::CoverCacheConfig;
use crate::services::covers::error::{CoverCacheError, DownloadError, FileSystemError};
use crate::services::covers::fetcher::{CoverFetcher, HttpCoverFetcher};
use crate::services::covers::path::CoverPaths;
use crate::services::covers::policy::resize_targets;
use crate::services::covers::resizer::{CoverResizer, ImageResizer};
use crate::services::covers::staleness::{LocalFileCheck, StalenessCheck};

/// 单个封面一轮刷新的结果
///
/// 失败是数据而不是展开的调用栈：一个封面失败不影响同条目的
/// 其余封面，也不影响其他条目。
#[derive(Debug)]
pub struct CoverRefreshOutcome {
    /// 封面类别
    pub kind: CoverKind,

    /// 本轮是否重新下载了原图（决定变体是否强制重建）
    pub downloaded: bool,

    /// 下载失败时的分类错误
    pub error: Option<CoverCacheError>,
}

/// 封面缓存服务
#[derive(Clone)]
pub struct CoverCacheService {
    /// 路径解析器（路径布局的唯一事实来源）
    paths: CoverPaths,

    /// 对外服务的 URL 前缀
    url_base: String,

    /// 下载能力
    fetcher: Arc<dyn CoverFetcher>,

    /// 新鲜度检查能力
    staleness: Arc<dyn StalenessCheck>,

    /// 缩放能力
    resizer: Arc<dyn CoverResizer>,

    /// 缩放闸门（进程级共享，容量 = 可用核数一半向上取整，最少 1）
    resize_gate: Arc<Semaphore>,
}

impl CoverCacheService {
    /// 创建新的封面缓存服务（生产能力集）
    ///
    /// # 参数
    /// - `config`: 封面缓存配置（URL 前缀、缓存根目录、并发上限）
    pub async fn new(config: &CoverCacheConfig) -> Result<Self, CoverCacheError> {
        let fetcher = Arc::new(HttpCoverFetcher::new()?);

        Self::with_capabilities(
            config,
            fetcher,
            Arc::new(LocalFileCheck),
            Arc::new(ImageResizer),
        )
        .await
    }

    /// 用显式能力集创建服务
    ///
    /// 能力接口可替换，测试可注入任意小的闸门容量与桩实现。
    pub async fn with_capabilities(
        config: &CoverCacheConfig,
        fetcher: Arc<dyn CoverFetcher>,
        staleness: Arc<dyn StalenessCheck>,
        resizer: Arc<dyn CoverResizer>,
    ) -> Result<Self, CoverCacheError> {
        // 确保缓存根目录存在
        fs::create_dir_all(&config.cache_dir).await.map_err(|e| {
            CoverCacheError::FileSystem(FileSystemError::CreateDirFailed(format!(
                "{:?}: {}",
                config.cache_dir, e
            )))
        })?;

        let capacity = config.resize_gate_capacity();
        info!("缩放闸门容量: {}", capacity);

        Ok(Self {
            paths: CoverPaths::new(config.cache_dir.clone()),
            url_base: config.url_base.trim_end_matches('/').to_string(),
            fetcher,
            staleness,
            resizer,
            resize_gate: Arc::new(Semaphore::new(capacity)),
        })
    }

    /// 获取路径解析器引用
    pub fn paths(&self) -> &CoverPaths {
        &self.paths
    }

    /// 刷新一个条目的全部封面缓存
    ///
    /// 这是条目更新事件的处理入口。流程：
    /// 1. 逐封面判断新鲜度，过期的下载原图（下载不受闸门限制）
    /// 2. 取得一个缩放闸门名额
    /// 3. 持有名额期间，为每个封面生成缺失/过期/被强制的缩放变体
    ///
    /// # 失败隔离
    /// 单个封面的下载失败、单个 (封面, 高度) 的缩放失败都只记录日志，
    /// 不中断兄弟封面/变体，也绝不向调用方抛异常。
    ///
    /// # 返回
    /// 每个封面一条结果，供调用方汇总与测试断言。
    pub async fn ensure_covers(&self, item: &MediaItem) -> Vec<CoverRefreshOutcome> {
        let covers = item.covers();
        if covers.is_empty() {
            debug!("条目 {} 没有封面，跳过", item.id);
            return Vec::new();
        }

        info!("开始刷新封面缓存: item_id={}, 封面数={}", item.id, covers.len());

        // 1. 下载阶段：逐封面判断新鲜度并下载，结果按封面聚合
        let mut outcomes = Vec::with_capacity(covers.len());
        for cover in &covers {
            outcomes.push(self.refresh_original(item.id, cover).await);
        }

        // 2. 缩放阶段：整个条目的缩放工作共享一个闸门名额，
        //    名额在本作用域结束时无条件释放（含任何失败路径）
        let _permit = match self.resize_gate.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                // 闸门只在进程关闭时才会关闭
                error!("获取缩放名额失败: item_id={}, error={}", item.id, e);
                return outcomes;
            }
        };

        for outcome in &outcomes {
            self.ensure_resized_covers(item.id, outcome).await;
        }

        info!(
            "封面缓存刷新完成: item_id={}, 新下载={}, 失败={}",
            item.id,
            outcomes.iter().filter(|o| o.downloaded).count(),
            outcomes.iter().filter(|o| o.error.is_some()).count()
        );

        outcomes
    }

    /// 刷新单个封面的原图（内部方法）
    async fn refresh_original(&self, item_id: MediaId, cover: &MediaCover) -> CoverRefreshOutcome {
        let original = self.paths.resolve(item_id, cover.kind, None);

        // 已有有效副本则跳过下载
        if self
            .staleness
            .already_exists(&cover.remote_url, &original)
            .await
        {
            debug!(
                "封面已是最新，跳过下载: item_id={}, kind={}",
                item_id,
                cover.kind.as_str()
            );
            return CoverRefreshOutcome {
                kind: cover.kind,
                downloaded: false,
                error: None,
            };
        }

        match self.fetcher.fetch(&cover.remote_url, &original).await {
            Ok(()) => CoverRefreshOutcome {
                kind: cover.kind,
                downloaded: true,
                error: None,
            },
            Err(e) => {
                // 下载失败只影响这个封面，本轮剩余封面继续处理。
                // 传输层失败是常态记 warn，其余失败记 error
                match &e {
                    DownloadError::NetworkError(_)
                    | DownloadError::Timeout
                    | DownloadError::HttpError(_) => warn!(
                        "封面下载失败: item_id={}, kind={}, url={}, error={}",
                        item_id,
                        cover.kind.as_str(),
                        cover.remote_url,
                        e
                    ),
                    _ => error!(
                        "封面下载出现意外失败: item_id={}, kind={}, url={}, error={}",
                        item_id,
                        cover.kind.as_str(),
                        cover.remote_url,
                        e
                    ),
                }
                CoverRefreshOutcome {
                    kind: cover.kind,
                    downloaded: false,
                    error: Some(CoverCacheError::Download(e)),
                }
            }
        }
    }

    /// 确保单个封面的全部缩放变体存在（内部方法，调用方持有闸门名额）
    ///
    /// 变体在以下情况重建：本轮刚下载过原图（强制）、变体缺失、
    /// 变体为零长度。缩放失败按 (封面, 高度) 记录，不再向上传播。
    async fn ensure_resized_covers(&self, item_id: MediaId, outcome: &CoverRefreshOutcome) {
        let targets = resize_targets(outcome.kind);
        if targets.is_empty() {
            return;
        }

        let original = self.paths.resolve(item_id, outcome.kind, None);

        // 没有可用原图就无从缩放，等下一次成功下载
        if !Self::file_has_content(&original).await {
            debug!(
                "无原图可供缩放: item_id={}, kind={}",
                item_id,
                outcome.kind.as_str()
            );
            return;
        }

        for &height in targets {
            let variant = self.paths.resolve(item_id, outcome.kind, Some(height));

            let needs_resize = outcome.downloaded || !Self::file_has_content(&variant).await;
            if !needs_resize {
                continue;
            }

            if let Err(e) = self.resizer.resize(&original, &variant, height).await {
                // 变体缺失时消费方回落到原图，这里降级记录即可
                debug!(
                    "封面缩放失败: item_id={}, kind={}, height={}, error={}",
                    item_id,
                    outcome.kind.as_str(),
                    height,
                    e
                );
            }
        }
    }

    /// 判断文件存在且非零长度（内部方法）
    async fn file_has_content(path: &Path) -> bool {
        match fs::metadata(path).await {
            Ok(meta) => meta.is_file() && meta.len() > 0,
            Err(_) => false,
        }
    }

    /// 清理一个条目的封面缓存目录
    ///
    /// 条目删除事件的处理入口。删除是无条件递归的；目录本就不存在
    /// 视为成功（幂等）。其余失败向上传播：静默失败会让已删除条目
    /// 的缓存目录永久泄漏。
    pub async fn purge_item(&self, item_id: MediaId) -> Result<(), CoverCacheError> {
        let dir = self.paths.item_dir(item_id);

        match fs::remove_dir_all(&dir).await {
            Ok(()) => {
                info!("封面缓存已清理: item_id={}, dir={:?}", item_id, dir);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("封面缓存目录不存在，无需清理: item_id={}", item_id);
                Ok(())
            }
            Err(e) => {
                error!("封面缓存清理失败: item_id={}, error={}", item_id, e);
                Err(CoverCacheError::FileSystem(
                    FileSystemError::RemoveDirFailed(format!("{:?}: {}", dir, e)),
                ))
            }
        }
    }

    /// 把封面列表的 URL 重写为本地服务地址
    ///
    /// 为每个封面生成 `<url_base>/MediaCover/{item_id}/{kind}.jpg`；
    /// 原图已落盘时附加按最后修改时间派生的缓存破坏参数。
    ///
    /// 只读取文件元数据，绝不触发下载，文件缺失也不报错
    /// （此时省略缓存破坏参数，回落行为由消费方决定）。
    pub async fn convert_to_local_urls(&self, item_id: MediaId, covers: &mut [MediaCover]) {
        for cover in covers.iter_mut() {
            let mut url = format!(
                "{}/MediaCover/{}/{}.jpg",
                self.url_base,
                item_id,
                cover.kind.as_str()
            );

            let original = self.paths.resolve(item_id, cover.kind, None);
            if let Some(last_write) = Self::last_write_timestamp(&original).await {
                url.push_str(&format!("?lastWrite={}", last_write));
            }

            cover.local_url = url;
        }
    }

    /// 读取文件最后修改时间的 Unix 秒（内部方法）
    async fn last_write_timestamp(path: &Path) -> Option<u64> {
        let meta = fs::metadata(path).await.ok()?;
        let modified = meta.modified().ok()?;
        modified
            .duration_since(std::time::UNIX_EPOCH)
            .ok()
            .map(|d| d.as_secs())
    }

    /// 获取封面缓存统计
    ///
    /// 遍历缓存根目录，按条目目录统计文件大小和数量。
    pub async fn get_cache_stats(&self) -> Result<CoverCacheStats, CoverCacheError> {
        let mut total_size: u64 = 0;
        let mut total_files: usize = 0;
        let mut item_count: usize = 0;

        let root = self.paths.root();
        if !root.exists() {
            return Ok(CoverCacheStats::default());
        }

        let mut entries = fs::read_dir(root)
            .await
            .map_err(|e| CoverCacheError::FileSystem(FileSystemError::IoError(e)))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| CoverCacheError::FileSystem(FileSystemError::IoError(e)))?
        {
            let path = entry.path();

            // 跳过非目录（配置备份之类的散落文件不计入统计）
            if !path.is_dir() {
                continue;
            }

            item_count += 1;

            let mut files = fs::read_dir(&path)
                .await
                .map_err(|e| CoverCacheError::FileSystem(FileSystemError::IoError(e)))?;

            while let Some(file) = files
                .next_entry()
                .await
                .map_err(|e| CoverCacheError::FileSystem(FileSystemError::IoError(e)))?
            {
                let meta = file
                    .metadata()
                    .await
                    .map_err(|e| CoverCacheError::FileSystem(FileSystemError::IoError(e)))?;

                if meta.is_file() {
                    total_size += meta.len();
                    total_files += 1;
                }
            }
        }

        Ok(CoverCacheStats {
            total_size,
            total_files,
            item_count,
        })
    }
}

/// 封面缓存统计信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverCacheStats {
    /// 总缓存大小（字节）
    pub total_size: u64,

    /// 总文件数
    pub total_files: usize,

    /// 有缓存的条目数
    pub item_count: usize,
}
