//! Playback Device Port - 输出设备抽象
//!
//! 宿主环境的媒体播放原语。具体实现在 infrastructure/adapters/player 层。

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::{DeviceError, PlaybackUrl};

/// 设备原生状态通知
///
/// 电平触发的状态快照，订阅方应整体替换自身派生状态而不是累积历史。
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceEvent {
    /// 播放位置变化（秒）
    TimeUpdate(f64),
    /// 源加载后元数据可用，携带时长（秒）
    LoadedMetadata(f64),
    /// 播放到达末尾
    Ended,
    /// 进入播放态（含暂停后恢复）
    Play,
    /// 进入暂停态
    Pause,
}

/// Playback Device Port
///
/// 不变量:
/// - 同一时刻至多加载一个源；load 覆盖上一个源
/// - 设备由单个 PlaybackManager 独占，生命周期与其一致
#[async_trait]
pub trait PlaybackDevice: Send + Sync {
    /// 加载新源（覆盖当前源，位置归零，处于暂停态）
    async fn load(&self, url: &PlaybackUrl) -> Result<(), DeviceError>;

    /// 带外预加载（不影响当前源与播放状态）
    fn preload(&self, url: &PlaybackUrl);

    /// 开始/恢复播放
    async fn play(&self) -> Result<(), DeviceError>;

    /// 暂停播放
    fn pause(&self);

    /// 当前播放位置（秒）
    fn position(&self) -> f64;

    /// 跳转到指定位置（秒）；越界值由设备自行收敛
    fn seek(&self, seconds: f64);

    /// 当前源时长（秒），元数据未知时为 None
    fn duration(&self) -> Option<f64>;

    /// 是否处于暂停态
    fn is_paused(&self) -> bool;

    /// 当前源是否已播放到末尾
    fn has_ended(&self) -> bool;

    /// 卸载当前源
    fn unload(&self);

    /// 订阅设备原生事件
    fn subscribe(&self) -> broadcast::Receiver<DeviceEvent>;
}

/// Playback Device Factory
///
/// 设备句柄与管理器同生命周期：每次创建管理器时配一个新设备，
/// 不做池化也不做惰性重建（否则缓存复用不变量需要重新审视）。
pub trait PlaybackDeviceFactory: Send + Sync {
    fn create(&self) -> Result<Arc<dyn PlaybackDevice>, DeviceError>;
}
