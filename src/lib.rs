// 媒体封面缓存后端库
//
// 本库提供媒体封面本地缓存的核心功能，包括：
// - API 路由
// - 媒体注册表（数据库）
// - 生命周期事件总线
// - 封面缓存流水线（下载、缩放、清理、URL 重写）

pub mod api;
pub mod database;
pub mod events;
pub mod models;
pub mod services;
