// 封面缓存模块错误类型定义
//
// 定义了封面缓存操作中可能出现的各种错误类型

use std::path::PathBuf;
use thiserror::Error;

/// 封面缓存操作的统一错误类型
#[derive(Debug, Error)]
pub enum CoverCacheError {
    #[error("下载错误: {0}")]
    Download(#[from] DownloadError),

    #[error("缩放错误: {0}")]
    Resize(#[from] ResizeError),

    #[error("文件系统错误: {0}")]
    FileSystem(#[from] FileSystemError),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),
}

/// 下载相关错误（传输层失败，逐封面隔离）
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("网络错误: {0}")]
    NetworkError(String),

    #[error("下载超时")]
    Timeout,

    #[error("无效的 URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP 错误: 状态码 {0}")]
    HttpError(u16),

    #[error("写入目标文件失败: {0}")]
    WriteFailed(String),
}

/// 图片缩放相关错误
#[derive(Debug, Error)]
pub enum ResizeError {
    #[error("源文件不存在: {0}")]
    SourceMissing(PathBuf),

    #[error("图片解码失败: {0}")]
    DecodeFailed(String),

    #[error("图片编码失败: {0}")]
    EncodeFailed(String),

    #[error("缩放失败: {0}")]
    ResizeFailed(String),
}

/// 文件系统相关错误
#[derive(Debug, Error)]
pub enum FileSystemError {
    #[error("路径不存在: {0}")]
    PathNotFound(PathBuf),

    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("创建目录失败: {0}")]
    CreateDirFailed(String),

    #[error("删除目录失败: {0}")]
    RemoveDirFailed(String),
}

// 实现从 reqwest::Error 到 DownloadError 的转换
impl From<reqwest::Error> for DownloadError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DownloadError::Timeout
        } else if err.is_status() {
            if let Some(status) = err.status() {
                DownloadError::HttpError(status.as_u16())
            } else {
                DownloadError::NetworkError(err.to_string())
            }
        } else {
            DownloadError::NetworkError(err.to_string())
        }
    }
}

// 实现从 reqwest::Error 到 CoverCacheError 的转换
impl From<reqwest::Error> for CoverCacheError {
    fn from(err: reqwest::Error) -> Self {
        CoverCacheError::Download(DownloadError::from(err))
    }
}
