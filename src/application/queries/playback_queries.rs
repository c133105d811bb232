//! Playback Queries - 播放会话状态查询

/// 查询当前播放会话状态快照
#[derive(Debug, Clone)]
pub struct PlaybackStateQuery;
