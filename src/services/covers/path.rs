// 封面缓存路径管理
//
// 提供统一的缓存文件路径生成规则，确保生产者与消费者永不分歧

use std::path::{Path, PathBuf};

use crate::models::{CoverKind, MediaId};

/// 封面路径解析器
///
/// 持有缓存根目录，提供统一的路径生成规则。路径计算是纯函数，
/// 不做任何 I/O，也没有失败分支。
#[derive(Debug, Clone)]
pub struct CoverPaths {
    /// 缓存根目录
    root: PathBuf,
}

impl CoverPaths {
    /// 创建路径解析器
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 获取缓存根目录
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 生成封面缓存路径
    ///
    /// # 参数
    /// - `item_id`: 媒体条目 ID
    /// - `kind`: 封面类别
    /// - `height`: 可选的目标高度（None 表示原图）
    ///
    /// # 返回
    /// 本地文件路径，格式：
    /// - 原图: `<root>/{item_id}/poster.jpg`
    /// - 缩放变体: `<root>/{item_id}/poster-250.jpg`
    ///
    /// # 示例
    /// ```
    /// use media_cover_backend::services::covers::CoverPaths;
    /// use media_cover_backend::models::CoverKind;
    ///
    /// let paths = CoverPaths::new("covers");
    /// let original = paths.resolve(42, CoverKind::Poster, None);
    /// assert_eq!(original.file_name().unwrap(), "poster.jpg");
    ///
    /// let variant = paths.resolve(42, CoverKind::Poster, Some(250));
    /// assert_eq!(variant.file_name().unwrap(), "poster-250.jpg");
    /// ```
    pub fn resolve(&self, item_id: MediaId, kind: CoverKind, height: Option<u32>) -> PathBuf {
        let filename = if let Some(h) = height {
            format!("{}-{}.jpg", kind.as_str(), h)
        } else {
            format!("{}.jpg", kind.as_str())
        };

        self.item_dir(item_id).join(filename)
    }

    /// 生成媒体条目的缓存目录路径
    ///
    /// 条目删除时整个目录被递归清理。
    pub fn item_dir(&self, item_id: MediaId) -> PathBuf {
        self.root.join(item_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn paths() -> CoverPaths {
        CoverPaths::new("covers")
    }

    #[test]
    fn test_resolve_original() {
        let path = paths().resolve(42, CoverKind::Poster, None);
        // 验证路径组件而不是字符串表示（跨平台兼容）
        assert_eq!(path.file_name().unwrap(), "poster.jpg");
        assert!(path.to_string_lossy().contains("42"));
        assert!(path.to_string_lossy().contains("covers"));
    }

    #[test]
    fn test_resolve_variant() {
        let path = paths().resolve(42, CoverKind::Poster, Some(500));
        assert_eq!(path.file_name().unwrap(), "poster-500.jpg");

        let path = paths().resolve(42, CoverKind::Banner, Some(35));
        assert_eq!(path.file_name().unwrap(), "banner-35.jpg");
    }

    #[test]
    fn test_item_dir() {
        let dir = paths().item_dir(42);
        assert!(dir.to_string_lossy().ends_with("42"));
        assert!(dir.starts_with("covers"));
    }

    #[test]
    fn test_variant_is_inside_item_dir() {
        let p = paths();
        let variant = p.resolve(7, CoverKind::Fanart, Some(360));
        assert!(variant.starts_with(p.item_dir(7)));
    }

    #[test]
    fn test_path_consistency() {
        // 相同输入生成相同路径
        let path1 = paths().resolve(1, CoverKind::Poster, None);
        let path2 = paths().resolve(1, CoverKind::Poster, None);
        assert_eq!(path1, path2);

        // 不同条目 ID 生成不同路径
        let path1 = paths().resolve(1, CoverKind::Poster, None);
        let path2 = paths().resolve(2, CoverKind::Poster, None);
        assert_ne!(path1, path2);

        // 原图与变体路径不同
        let original = paths().resolve(1, CoverKind::Poster, None);
        let variant = paths().resolve(1, CoverKind::Poster, Some(250));
        assert_ne!(original, variant);
    }

    proptest! {
        /// 路径解析对任意输入都是纯函数：重复调用结果稳定，
        /// 且始终落在该条目的缓存目录之内
        #[test]
        fn prop_resolve_stable(item_id in 1i64..=i64::MAX, height in proptest::option::of(1u32..=4096)) {
            let p = CoverPaths::new("covers");
            let a = p.resolve(item_id, CoverKind::Fanart, height);
            let b = p.resolve(item_id, CoverKind::Fanart, height);
            prop_assert_eq!(&a, &b);
            prop_assert!(a.starts_with(p.item_dir(item_id)));
        }
    }
}
