//! Playback Query Handlers

use std::sync::Arc;
use uuid::Uuid;

use crate::application::error::ApplicationError;
use crate::application::queries::PlaybackStateQuery;
use crate::infrastructure::memory::PlaybackSessions;

/// 播放会话状态快照
///
/// 电平式快照，与事件流互补：客户端重连后先取快照再续订事件
#[derive(Debug, Clone)]
pub struct PlaybackStateResponse {
    pub active: bool,
    pub playback_id: Option<String>,
    pub set_id: Option<Uuid>,
    pub current_message_id: Option<Uuid>,
    pub position_secs: f64,
    pub duration_secs: Option<f64>,
    pub is_paused: bool,
    pub has_ended: bool,
}

impl PlaybackStateResponse {
    fn inactive() -> Self {
        Self {
            active: false,
            playback_id: None,
            set_id: None,
            current_message_id: None,
            position_secs: 0.0,
            duration_secs: None,
            is_paused: true,
            has_ended: false,
        }
    }
}

/// GetPlaybackState Handler
pub struct GetPlaybackStateHandler {
    playback_sessions: Arc<PlaybackSessions>,
}

impl GetPlaybackStateHandler {
    pub fn new(playback_sessions: Arc<PlaybackSessions>) -> Self {
        Self { playback_sessions }
    }

    pub async fn handle(
        &self,
        _query: PlaybackStateQuery,
    ) -> Result<PlaybackStateResponse, ApplicationError> {
        let Some(active) = self.playback_sessions.active() else {
            return Ok(PlaybackStateResponse::inactive());
        };

        Ok(PlaybackStateResponse {
            active: true,
            playback_id: Some(active.playback_id),
            set_id: Some(active.set_id),
            current_message_id: active
                .manager
                .current_message_id()
                .map(|id| *id.as_uuid()),
            position_secs: active.device.position(),
            duration_secs: active.device.duration(),
            is_paused: active.device.is_paused(),
            has_ended: active.device.has_ended(),
        })
    }
}
