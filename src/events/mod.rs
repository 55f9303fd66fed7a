// 事件总线 - 媒体条目生命周期事件的类型化分发
//
// 每种事件一条独立的 broadcast 通道，处理器按事件类型显式订阅，
// 流水线不依赖任何特定的分发机制。

pub mod handlers;

use tokio::sync::broadcast;

use crate::models::{MediaId, MediaItem};

pub use handlers::CoverMaintenanceWorker;

/// 各通道的缓冲长度
///
/// 订阅方落后超过缓冲长度会收到 Lagged 并丢失最旧的事件；
/// 封面维护属于尽力而为的后台工作，丢失的事件由下一次条目更新补偿。
const CHANNEL_CAPACITY: usize = 64;

/// 事件总线
///
/// 克隆开销低（内部是 broadcast 发送端），可随状态注入各处。
#[derive(Clone)]
pub struct EventBus {
    item_updated: broadcast::Sender<MediaItem>,
    item_deleted: broadcast::Sender<MediaId>,
    covers_updated: broadcast::Sender<MediaId>,
}

impl EventBus {
    /// 创建新的事件总线
    pub fn new() -> Self {
        let (item_updated, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (item_deleted, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (covers_updated, _) = broadcast::channel(CHANNEL_CAPACITY);

        Self {
            item_updated,
            item_deleted,
            covers_updated,
        }
    }

    /// 发布条目更新事件
    ///
    /// 没有订阅者时发送会失败，这不是错误：后台工作器尚未启动
    /// 或已停止时事件自然丢弃。
    pub fn publish_item_updated(&self, item: MediaItem) {
        let _ = self.item_updated.send(item);
    }

    /// 发布条目删除事件
    pub fn publish_item_deleted(&self, item_id: MediaId) {
        let _ = self.item_deleted.send(item_id);
    }

    /// 发布封面更新完成事件
    ///
    /// 条目的一轮封面刷新结束后发布（无论全部成功还是部分失败），
    /// 下游消费方据此得知本地 URL 已是最新。
    pub fn publish_covers_updated(&self, item_id: MediaId) {
        let _ = self.covers_updated.send(item_id);
    }

    /// 订阅条目更新事件
    pub fn subscribe_item_updated(&self) -> broadcast::Receiver<MediaItem> {
        self.item_updated.subscribe()
    }

    /// 订阅条目删除事件
    pub fn subscribe_item_deleted(&self) -> broadcast::Receiver<MediaId> {
        self.item_deleted.subscribe()
    }

    /// 订阅封面更新完成事件
    pub fn subscribe_covers_updated(&self) -> broadcast::Receiver<MediaId> {
        self.covers_updated.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
