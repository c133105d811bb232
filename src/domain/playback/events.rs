//! Playback Events - 管理器对外事件

use serde::{Deserialize, Serialize};

/// 播放状态事件
///
/// 与设备原生通知一一对应，电平触发；订阅方用每次事件整体替换派生状态。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum PlaybackEvent {
    /// 播放位置变化
    Progress { seconds: f64 },
    /// 源加载后时长可知
    DurationKnown { seconds: f64 },
    /// 播放结束
    Ended,
    /// 进入播放态（含恢复）
    Started,
    /// 进入暂停态
    Paused,
}
