// 封面缩放器 - 从原图派生固定高度的变体
//
// 本模块提供封面图片的缩放能力，包括：
// - 按目标高度等比缩放
// - JPEG 编码输出
// - CPU 密集部分移入阻塞线程池，避免阻塞异步运行时

use std::io::Cursor;
use std::path::Path;

use async_trait::async_trait;
use image::imageops::FilterType;
use image::ImageFormat;
use tokio::task;
use tracing::debug;

use crate::services::covers::error::ResizeError;

/// 封面缩放能力
///
/// 把 `source` 的原图缩放到目标高度并写入 `dest`。
/// 输入损坏或格式不支持时返回 `ResizeError`。
#[async_trait]
pub trait CoverResizer: Send + Sync {
    async fn resize(&self, source: &Path, dest: &Path, height: u32) -> Result<(), ResizeError>;
}

/// 基于 image crate 的缩放器
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageResizer;

impl ImageResizer {
    /// 解码、缩放并编码为 JPEG（同步，CPU 密集）
    fn resize_to_jpeg(data: &[u8], height: u32) -> Result<Vec<u8>, ResizeError> {
        // 解码图片
        let img = image::load_from_memory(data)
            .map_err(|e| ResizeError::DecodeFailed(format!("图片解码失败: {}", e)))?;

        // 等比缩放到目标高度（宽度不设上限）
        let resized = img.resize(u32::MAX, height, FilterType::Lanczos3);

        // JPEG 不支持透明通道，统一转为 RGB8
        let rgb = image::DynamicImage::ImageRgb8(resized.to_rgb8());

        let mut buffer = Vec::new();
        rgb.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
            .map_err(|e| ResizeError::EncodeFailed(format!("JPEG 编码失败: {}", e)))?;

        Ok(buffer)
    }
}

#[async_trait]
impl CoverResizer for ImageResizer {
    /// 生成一个缩放变体
    ///
    /// # 参数
    /// - `source`: 原图路径（最高保真来源）
    /// - `dest`: 变体输出路径
    /// - `height`: 目标高度（像素）
    async fn resize(&self, source: &Path, dest: &Path, height: u32) -> Result<(), ResizeError> {
        // 读取原图
        let data = tokio::fs::read(source)
            .await
            .map_err(|_| ResizeError::SourceMissing(source.to_path_buf()))?;

        if data.is_empty() {
            return Err(ResizeError::SourceMissing(source.to_path_buf()));
        }

        // CPU 密集型缩放移到阻塞线程池
        let jpeg = task::spawn_blocking(move || Self::resize_to_jpeg(&data, height))
            .await
            .map_err(|e| ResizeError::ResizeFailed(format!("任务执行失败: {}", e)))??;

        // 确保父目录存在后写入
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ResizeError::ResizeFailed(format!("创建目录失败: {}", e)))?;
        }

        tokio::fs::write(dest, &jpeg)
            .await
            .map_err(|e| ResizeError::ResizeFailed(format!("写入变体失败: {}", e)))?;

        debug!("变体已生成: {:?} (高度 {})", dest, height);
        Ok(())
    }
}
