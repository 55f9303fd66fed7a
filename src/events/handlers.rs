// 封面维护工作器 - 订阅条目生命周期事件并驱动封面缓存
//
// 条目更新 → 刷新该条目的封面缓存，完成后发布"封面已更新"；
// 条目删除 → 递归清理该条目的缓存目录。
// 工作器作为后台任务运行，进程存活期间持续消费事件。

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use crate::events::EventBus;
use crate::models::{MediaId, MediaItem};
use crate::services::covers::CoverCacheService;

/// 封面维护工作器
pub struct CoverMaintenanceWorker {
    bus: EventBus,
    service: Arc<CoverCacheService>,
    updated_rx: broadcast::Receiver<MediaItem>,
    deleted_rx: broadcast::Receiver<MediaId>,
}

impl CoverMaintenanceWorker {
    /// 创建新的工作器
    ///
    /// 订阅在构造时建立，构造之后发布的事件不会丢失，
    /// 即使 `run` 的任务尚未被调度。
    pub fn new(bus: EventBus, service: Arc<CoverCacheService>) -> Self {
        let updated_rx = bus.subscribe_item_updated();
        let deleted_rx = bus.subscribe_item_deleted();

        Self {
            bus,
            service,
            updated_rx,
            deleted_rx,
        }
    }

    /// 启动事件循环（消费 self）
    ///
    /// 通常以 `tokio::spawn(worker.run())` 方式启动。两类事件在
    /// 同一个循环里处理，条目之间的并行度来自并发的事件投递方，
    /// 而缩放并行度始终由服务内部的闸门限制。
    pub async fn run(self) {
        let Self {
            bus,
            service,
            mut updated_rx,
            mut deleted_rx,
        } = self;

        info!("封面维护工作器已启动");

        loop {
            tokio::select! {
                result = updated_rx.recv() => match result {
                    Ok(item) => {
                        let item_id = item.id;
                        debug!("收到条目更新事件: item_id={}", item_id);

                        // 刷新封面；部分失败也照常发布完成事件，
                        // 失败的封面等下一次条目更新重试
                        service.ensure_covers(&item).await;
                        bus.publish_covers_updated(item_id);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("条目更新事件积压，丢失 {} 条", skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
                result = deleted_rx.recv() => match result {
                    Ok(item_id) => {
                        debug!("收到条目删除事件: item_id={}", item_id);

                        if let Err(e) = service.purge_item(item_id).await {
                            // 清理失败不能静默，否则缓存目录永久泄漏
                            error!("条目缓存清理失败: item_id={}, error={}", item_id, e);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("条目删除事件积压，丢失 {} 条", skipped);
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }

        info!("封面维护工作器已停止");
    }
}
