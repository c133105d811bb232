//! Playback Commands - 播放会话相关命令

use uuid::Uuid;

/// 打开播放会话命令 - 进入语音集详情时调用
///
/// 已有活跃会话时先将其关闭（清缓存、卸载设备源）
#[derive(Debug, Clone)]
pub struct OpenPlaybackCommand {
    pub set_id: Uuid,
}

/// 打开播放会话响应
#[derive(Debug, Clone)]
pub struct OpenPlaybackResponse {
    pub playback_id: String,
    pub set_id: Uuid,
    /// 被替换掉的上一个会话（如有）
    pub replaced_playback_id: Option<String>,
}

/// 播放/暂停裁决命令
#[derive(Debug, Clone)]
pub struct TogglePlaybackCommand {
    pub message_id: Uuid,
}

/// 播放/暂停裁决响应
#[derive(Debug, Clone)]
pub struct TogglePlaybackResponse {
    pub message_id: Uuid,
    /// 裁决结果（restarted/resumed/paused/switched/unavailable/superseded）
    pub outcome: &'static str,
}

/// 预取命令 - 解析并缓存消息的播放 URL
#[derive(Debug, Clone)]
pub struct PrefetchPlaybackCommand {
    pub message_id: Uuid,
}

/// 暂停命令
#[derive(Debug, Clone)]
pub struct PausePlaybackCommand;

/// 跳转命令
#[derive(Debug, Clone)]
pub struct SeekPlaybackCommand {
    pub seconds: f64,
}

/// 关闭播放会话命令 - 离开语音集详情时调用；幂等
#[derive(Debug, Clone)]
pub struct ClosePlaybackCommand;

/// 关闭播放会话响应
#[derive(Debug, Clone)]
pub struct ClosePlaybackResponse {
    /// 被关闭的会话；没有活跃会话时为 None
    pub closed_playback_id: Option<String>,
}
