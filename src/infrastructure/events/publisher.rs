//! Event Publisher Implementation
//!
//! WebSocket 事件推送实现
//!
//! 两类通道：
//! - 全局通道：语音集/消息 CRUD 与合成任务状态（数据反应性）
//! - 播放通道：按 playback_id 注册，承载播放状态事件

use crate::application::ports::GenerationState;
use crate::domain::playback::PlaybackEvent;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

/// WebSocket 事件类型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum WsEvent {
    /// 合成任务状态变更
    GenerationStateChanged {
        task_id: String,
        message_id: Uuid,
        set_id: Uuid,
        state: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// 语音集已创建
    SetCreated { set_id: Uuid },
    /// 语音集已更新
    SetUpdated { set_id: Uuid },
    /// 语音集已删除
    SetDeleted { set_id: Uuid },
    /// 消息已创建
    MessageCreated {
        message_id: Uuid,
        set_id: Uuid,
        position: u32,
    },
    /// 消息已更新
    MessageUpdated { message_id: Uuid, set_id: Uuid },
    /// 消息已删除
    MessageDeleted { message_id: Uuid, set_id: Uuid },
    /// 播放状态事件
    Playback {
        playback_id: String,
        #[serde(flatten)]
        event: PlaybackEvent,
    },
    /// 播放会话关闭
    PlaybackClosed { playback_id: String, reason: String },
}

/// 事件发布器
pub struct EventPublisher {
    /// playback_id -> broadcast sender (播放会话事件)
    playback_channels: DashMap<String, broadcast::Sender<WsEvent>>,
    /// 全局广播通道（CRUD 与合成任务事件）
    global_channel: broadcast::Sender<WsEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (global_tx, _) = broadcast::channel(100);
        Self {
            playback_channels: DashMap::new(),
            global_channel: global_tx,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅全局事件
    pub fn subscribe_global(&self) -> broadcast::Receiver<WsEvent> {
        self.global_channel.subscribe()
    }

    /// 注册播放会话的事件通道
    pub fn register_playback(&self, playback_id: &str) -> broadcast::Receiver<WsEvent> {
        if let Some(sender) = self.playback_channels.get(playback_id) {
            return sender.subscribe();
        }

        let (tx, rx) = broadcast::channel(100);
        self.playback_channels.insert(playback_id.to_string(), tx);
        rx
    }

    /// 取消注册播放会话
    pub fn unregister_playback(&self, playback_id: &str) {
        self.playback_channels.remove(playback_id);
    }

    /// 获取播放会话的事件接收器
    pub fn subscribe_playback(&self, playback_id: &str) -> Option<broadcast::Receiver<WsEvent>> {
        self.playback_channels
            .get(playback_id)
            .map(|s| s.subscribe())
    }

    // ========== 合成任务事件 ==========

    /// 发布任务已入队事件
    pub fn publish_generation_pending(&self, task_id: &str, message_id: Uuid, set_id: Uuid) {
        self.publish_generation_state(task_id, message_id, set_id, GenerationState::Pending, None, None);
    }

    /// 发布任务开始合成事件
    pub fn publish_generation_generating(&self, task_id: &str, message_id: Uuid, set_id: Uuid) {
        self.publish_generation_state(
            task_id,
            message_id,
            set_id,
            GenerationState::Generating,
            None,
            None,
        );
    }

    /// 发布任务完成事件（带时长）
    pub fn publish_generation_ready(
        &self,
        task_id: &str,
        message_id: Uuid,
        set_id: Uuid,
        duration_ms: Option<u64>,
    ) {
        self.publish_generation_state(
            task_id,
            message_id,
            set_id,
            GenerationState::Ready,
            duration_ms,
            None,
        );
    }

    /// 发布任务失败事件
    pub fn publish_generation_failed(
        &self,
        task_id: &str,
        message_id: Uuid,
        set_id: Uuid,
        error: &str,
    ) {
        self.publish_generation_state(
            task_id,
            message_id,
            set_id,
            GenerationState::Failed,
            None,
            Some(error.to_string()),
        );
    }

    fn publish_generation_state(
        &self,
        task_id: &str,
        message_id: Uuid,
        set_id: Uuid,
        state: GenerationState,
        duration_ms: Option<u64>,
        error: Option<String>,
    ) {
        self.publish_global(WsEvent::GenerationStateChanged {
            task_id: task_id.to_string(),
            message_id,
            set_id,
            state: state.as_str().to_string(),
            duration_ms,
            error,
        });
    }

    // ========== CRUD 事件 ==========

    pub fn publish_set_created(&self, set_id: Uuid) {
        self.publish_global(WsEvent::SetCreated { set_id });
    }

    pub fn publish_set_updated(&self, set_id: Uuid) {
        self.publish_global(WsEvent::SetUpdated { set_id });
    }

    pub fn publish_set_deleted(&self, set_id: Uuid) {
        self.publish_global(WsEvent::SetDeleted { set_id });
    }

    pub fn publish_message_created(&self, message_id: Uuid, set_id: Uuid, position: u32) {
        self.publish_global(WsEvent::MessageCreated {
            message_id,
            set_id,
            position,
        });
    }

    pub fn publish_message_updated(&self, message_id: Uuid, set_id: Uuid) {
        self.publish_global(WsEvent::MessageUpdated { message_id, set_id });
    }

    pub fn publish_message_deleted(&self, message_id: Uuid, set_id: Uuid) {
        self.publish_global(WsEvent::MessageDeleted { message_id, set_id });
    }

    // ========== 播放事件 ==========

    /// 发布播放状态事件到对应会话通道
    pub fn publish_playback_event(&self, playback_id: &str, event: PlaybackEvent) {
        self.publish_to_playback(
            playback_id,
            WsEvent::Playback {
                playback_id: playback_id.to_string(),
                event,
            },
        );
    }

    /// 发布播放会话关闭事件
    pub fn publish_playback_closed(&self, playback_id: &str, reason: &str) {
        self.publish_to_playback(
            playback_id,
            WsEvent::PlaybackClosed {
                playback_id: playback_id.to_string(),
                reason: reason.to_string(),
            },
        );
    }

    fn publish_global(&self, event: WsEvent) {
        if let Err(e) = self.global_channel.send(event) {
            tracing::debug!(error = %e, "Failed to publish global event (no receivers)");
        }
    }

    fn publish_to_playback(&self, playback_id: &str, event: WsEvent) {
        if let Some(sender) = self.playback_channels.get(playback_id) {
            if let Err(e) = sender.send(event) {
                tracing::debug!(
                    playback_id = %playback_id,
                    error = %e,
                    "Failed to publish playback event (no receivers)"
                );
            }
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_global_events_reach_subscriber() {
        let publisher = EventPublisher::new();
        let mut rx = publisher.subscribe_global();
        let set_id = Uuid::new_v4();

        publisher.publish_set_created(set_id);

        match rx.recv().await.unwrap() {
            WsEvent::SetCreated { set_id: received } => assert_eq!(received, set_id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_playback_events_are_scoped_to_session() {
        let publisher = EventPublisher::new();
        let mut rx_a = publisher.register_playback("a");
        let mut rx_b = publisher.register_playback("b");

        publisher.publish_playback_event("a", PlaybackEvent::Started);

        assert!(matches!(
            rx_a.recv().await.unwrap(),
            WsEvent::Playback { .. }
        ));
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unregistered_playback_channel_drops_events() {
        let publisher = EventPublisher::new();
        let _rx = publisher.register_playback("a");
        publisher.unregister_playback("a");

        // 不 panic，静默丢弃
        publisher.publish_playback_event("a", PlaybackEvent::Ended);
        assert!(publisher.subscribe_playback("a").is_none());
    }
}
