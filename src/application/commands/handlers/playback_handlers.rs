//! Playback Command Handlers
//!
//! HTTP 操作与播放管理器之间的桥接。解析闭包在这里组装：
//! message_id → 最近生成记录 → 本地存储 URL，查不到音频时返回 None。

use std::sync::Arc;

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::application::commands::playback_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{AudioStoragePort, MessageRepositoryPort, SetRepositoryPort};
use crate::domain::playback::{PlaybackError, PlaybackUrl};
use crate::domain::set::MessageId;
use crate::infrastructure::events::EventPublisher;
use crate::infrastructure::memory::{ActivePlayback, PlaybackSessions};

/// 解析消息的播放 URL
///
/// Ok(None) 表示"尚无可播放音频"（未生成，或文件已不在）；
/// 仓储/存储故障映射为 Resolver 错误向上传播。
pub async fn resolve_clip_url(
    message_repo: Arc<dyn MessageRepositoryPort>,
    audio_storage: Arc<dyn AudioStoragePort>,
    base_url: String,
    message_id: Uuid,
) -> Result<Option<PlaybackUrl>, PlaybackError> {
    let message = message_repo
        .find_by_id(message_id)
        .await
        .map_err(|e| PlaybackError::Resolver(e.to_string()))?;

    let Some(meta) = message.and_then(|m| m.last_generation) else {
        return Ok(None);
    };

    if !audio_storage.exists(meta.clip_id).await {
        tracing::warn!(
            message_id = %message_id,
            clip_id = %meta.clip_id,
            "Generation record points at a missing clip"
        );
        return Ok(None);
    }

    let url = PlaybackUrl::new(format!("{}/api/audio/file/{}", base_url, meta.clip_id))
        .map_err(|e| PlaybackError::Resolver(e.to_string()))?;

    Ok(Some(url))
}

fn require_active(sessions: &PlaybackSessions) -> Result<ActivePlayback, ApplicationError> {
    sessions
        .active()
        .ok_or_else(|| ApplicationError::invalid_state("No active playback session"))
}

/// OpenPlayback Handler - 进入语音集详情，创建播放会话
pub struct OpenPlaybackHandler {
    set_repo: Arc<dyn SetRepositoryPort>,
    playback_sessions: Arc<PlaybackSessions>,
    event_publisher: Arc<EventPublisher>,
}

impl OpenPlaybackHandler {
    pub fn new(
        set_repo: Arc<dyn SetRepositoryPort>,
        playback_sessions: Arc<PlaybackSessions>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            set_repo,
            playback_sessions,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: OpenPlaybackCommand,
    ) -> Result<OpenPlaybackResponse, ApplicationError> {
        self.set_repo
            .find_by_id(cmd.set_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Set", cmd.set_id))?;

        let opened = self
            .playback_sessions
            .open(cmd.set_id)
            .map_err(|e| ApplicationError::PlaybackError(e.to_string()))?;

        if let Some(old_id) = &opened.replaced_playback_id {
            self.event_publisher
                .publish_playback_closed(old_id, "replaced");
            self.event_publisher.unregister_playback(old_id);
        }

        // 管理器事件 → WebSocket 通道；管理器销毁时通道关闭，任务随之退出
        self.event_publisher
            .register_playback(&opened.playback_id);
        let mut events = opened.manager.subscribe();
        let publisher = self.event_publisher.clone();
        let playback_id = opened.playback_id.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => publisher.publish_playback_event(&playback_id, event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(
                            playback_id = %playback_id,
                            skipped,
                            "Playback event stream lagged"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        tracing::info!(
            playback_id = %opened.playback_id,
            set_id = %cmd.set_id,
            replaced = ?opened.replaced_playback_id,
            "Playback session opened"
        );

        Ok(OpenPlaybackResponse {
            playback_id: opened.playback_id,
            set_id: cmd.set_id,
            replaced_playback_id: opened.replaced_playback_id,
        })
    }
}

/// TogglePlayback Handler - 播放/暂停裁决
pub struct TogglePlaybackHandler {
    message_repo: Arc<dyn MessageRepositoryPort>,
    audio_storage: Arc<dyn AudioStoragePort>,
    playback_sessions: Arc<PlaybackSessions>,
    base_url: String,
}

impl TogglePlaybackHandler {
    pub fn new(
        message_repo: Arc<dyn MessageRepositoryPort>,
        audio_storage: Arc<dyn AudioStoragePort>,
        playback_sessions: Arc<PlaybackSessions>,
        base_url: String,
    ) -> Self {
        Self {
            message_repo,
            audio_storage,
            playback_sessions,
            base_url,
        }
    }

    pub async fn handle(
        &self,
        cmd: TogglePlaybackCommand,
    ) -> Result<TogglePlaybackResponse, ApplicationError> {
        let active = require_active(&self.playback_sessions)?;

        let message_repo = self.message_repo.clone();
        let audio_storage = self.audio_storage.clone();
        let base_url = self.base_url.clone();

        let outcome = active
            .manager
            .play_or_toggle(MessageId::from_uuid(cmd.message_id), move || {
                resolve_clip_url(message_repo, audio_storage, base_url, cmd.message_id)
            })
            .await?;

        tracing::debug!(
            playback_id = %active.playback_id,
            message_id = %cmd.message_id,
            outcome = outcome.as_str(),
            "Playback toggled"
        );

        Ok(TogglePlaybackResponse {
            message_id: cmd.message_id,
            outcome: outcome.as_str(),
        })
    }
}

/// PrefetchPlayback Handler - 预解析并缓存播放 URL
pub struct PrefetchPlaybackHandler {
    message_repo: Arc<dyn MessageRepositoryPort>,
    audio_storage: Arc<dyn AudioStoragePort>,
    playback_sessions: Arc<PlaybackSessions>,
    base_url: String,
}

impl PrefetchPlaybackHandler {
    pub fn new(
        message_repo: Arc<dyn MessageRepositoryPort>,
        audio_storage: Arc<dyn AudioStoragePort>,
        playback_sessions: Arc<PlaybackSessions>,
        base_url: String,
    ) -> Self {
        Self {
            message_repo,
            audio_storage,
            playback_sessions,
            base_url,
        }
    }

    pub async fn handle(&self, cmd: PrefetchPlaybackCommand) -> Result<(), ApplicationError> {
        let active = require_active(&self.playback_sessions)?;

        let message_repo = self.message_repo.clone();
        let audio_storage = self.audio_storage.clone();
        let base_url = self.base_url.clone();

        active
            .manager
            .prefetch(MessageId::from_uuid(cmd.message_id), move || {
                resolve_clip_url(message_repo, audio_storage, base_url, cmd.message_id)
            })
            .await?;

        Ok(())
    }
}

/// PausePlayback Handler
pub struct PausePlaybackHandler {
    playback_sessions: Arc<PlaybackSessions>,
}

impl PausePlaybackHandler {
    pub fn new(playback_sessions: Arc<PlaybackSessions>) -> Self {
        Self { playback_sessions }
    }

    pub async fn handle(&self, _cmd: PausePlaybackCommand) -> Result<(), ApplicationError> {
        let active = require_active(&self.playback_sessions)?;
        active.manager.pause();
        Ok(())
    }
}

/// SeekPlayback Handler - 位置跳转；越界值交由设备收敛
pub struct SeekPlaybackHandler {
    playback_sessions: Arc<PlaybackSessions>,
}

impl SeekPlaybackHandler {
    pub fn new(playback_sessions: Arc<PlaybackSessions>) -> Self {
        Self { playback_sessions }
    }

    pub async fn handle(&self, cmd: SeekPlaybackCommand) -> Result<(), ApplicationError> {
        if !cmd.seconds.is_finite() || cmd.seconds < 0.0 {
            return Err(ApplicationError::validation(
                "Seek position must be a non-negative number",
            ));
        }

        let active = require_active(&self.playback_sessions)?;
        active.manager.seek(cmd.seconds);
        Ok(())
    }
}

/// ClosePlayback Handler - 清缓存、卸载设备源；幂等
pub struct ClosePlaybackHandler {
    playback_sessions: Arc<PlaybackSessions>,
    event_publisher: Arc<EventPublisher>,
}

impl ClosePlaybackHandler {
    pub fn new(
        playback_sessions: Arc<PlaybackSessions>,
        event_publisher: Arc<EventPublisher>,
    ) -> Self {
        Self {
            playback_sessions,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        _cmd: ClosePlaybackCommand,
    ) -> Result<ClosePlaybackResponse, ApplicationError> {
        let closed = self.playback_sessions.close();

        if let Some(playback_id) = &closed {
            self.event_publisher
                .publish_playback_closed(playback_id, "client_close");
            self.event_publisher.unregister_playback(playback_id);
            tracing::info!(playback_id = %playback_id, "Playback session closed");
        }

        Ok(ClosePlaybackResponse {
            closed_playback_id: closed,
        })
    }
}
