// 新鲜度检查 - 判断缓存副本是否仍然有效
//
// 返回 true 表示"跳过下载"；因此缺失或零长度的文件绝不能被判为新鲜，
// 拿不准时宁可返回 false（代价是一次多余的下载，而不是陈旧缓存）。

use std::path::Path;

use async_trait::async_trait;

/// 新鲜度检查能力
///
/// 具体策略可插拔（条件请求、校验和、或纯本地存在性检查），
/// 契约只有一条：返回 true 意味着可以安全跳过下载。
#[async_trait]
pub trait StalenessCheck: Send + Sync {
    /// 判断本地副本相对远程来源是否仍然有效
    ///
    /// # 参数
    /// - `remote_url`: 远程图片 URL
    /// - `local_path`: 候选本地路径
    async fn already_exists(&self, remote_url: &str, local_path: &Path) -> bool;
}

/// 默认策略：本地存在且非零长度即视为有效
///
/// 不发出任何网络请求。远程内容变化只能通过条目更新事件之外的
/// 手动刷新触发重新下载。
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileCheck;

#[async_trait]
impl StalenessCheck for LocalFileCheck {
    async fn already_exists(&self, _remote_url: &str, local_path: &Path) -> bool {
        match tokio::fs::metadata(local_path).await {
            Ok(meta) => meta.is_file() && meta.len() > 0,
            Err(_) => false,
        }
    }
}
