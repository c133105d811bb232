//! Playback Context - Errors

use thiserror::Error;

/// 输出设备错误
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Audio output unavailable: {0}")]
    OutputUnavailable(String),

    #[error("Failed to fetch audio: {0}")]
    FetchFailed(String),

    #[error("Failed to decode audio: {0}")]
    DecodeFailed(String),

    #[error("No source loaded")]
    NoSource,
}

/// 播放管理器错误
///
/// 解析缺失（resolver 返回 None）不是错误，是静默 no-op；
/// 这里只承载 resolver 失败与设备失败两类，均直接向调用方传播。
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Resolver failed: {0}")]
    Resolver(String),

    #[error(transparent)]
    Device(#[from] DeviceError),
}
