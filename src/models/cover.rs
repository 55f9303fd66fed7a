// 封面模型 - 封面类别与封面描述符
//
// 本模块定义媒体封面的核心数据结构，包括：
// - 封面类别（封闭枚举，决定文件名与缩放规格）
// - 封面描述符（远程 URL + 本地 URL）

use serde::{Deserialize, Serialize};

/// 封面类别
///
/// 封闭枚举，类别同时决定缓存文件名与适用的缩放高度。
/// 没有缩放规格的类别（如 Clearlogo、Unknown）只缓存原图。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CoverKind {
    /// 竖版海报
    Poster,

    /// 横幅
    Banner,

    /// 背景图
    Fanart,

    /// 截图
    Screenshot,

    /// 人物头像
    Headshot,

    /// 透明台标
    Clearlogo,

    /// 未知类别
    Unknown,
}

impl CoverKind {
    /// 将封面类别转换为小写文件名主干
    pub fn as_str(&self) -> &'static str {
        match self {
            CoverKind::Poster => "poster",
            CoverKind::Banner => "banner",
            CoverKind::Fanart => "fanart",
            CoverKind::Screenshot => "screenshot",
            CoverKind::Headshot => "headshot",
            CoverKind::Clearlogo => "clearlogo",
            CoverKind::Unknown => "unknown",
        }
    }

    /// 从字符串解析封面类别
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "poster" => Some(CoverKind::Poster),
            "banner" => Some(CoverKind::Banner),
            "fanart" => Some(CoverKind::Fanart),
            "screenshot" => Some(CoverKind::Screenshot),
            "headshot" => Some(CoverKind::Headshot),
            "clearlogo" => Some(CoverKind::Clearlogo),
            "unknown" => Some(CoverKind::Unknown),
            _ => None,
        }
    }
}

/// 封面描述符
///
/// 一个媒体条目拥有零到多个封面，每个封面记录：
/// - `kind`: 封面类别
/// - `remote_url`: 刮削来源的远程图片地址
/// - `local_url`: 本地服务地址（由 URL 重写在序列化时填充，可为空）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaCover {
    /// 封面类别
    pub kind: CoverKind,

    /// 远程图片 URL
    pub remote_url: String,

    /// 本地服务 URL（派生字段，带缓存破坏参数）
    #[serde(default)]
    pub local_url: String,
}

impl MediaCover {
    /// 创建新的封面描述符（本地 URL 留空，由 URL 重写填充）
    pub fn new(kind: CoverKind, remote_url: impl Into<String>) -> Self {
        Self {
            kind,
            remote_url: remote_url.into(),
            local_url: String::new(),
        }
    }
}
