//! Playback Context - 播放限界上下文
//!
//! 职责:
//! - 播放管理器：单一输出设备上的消息切换/暂停/续播
//! - 播放 URL 记忆化（每条消息至多解析一次）
//! - 设备状态事件的订阅转发

mod device;
mod errors;
mod events;
mod manager;
mod value_objects;

pub use device::{DeviceEvent, PlaybackDevice, PlaybackDeviceFactory};
pub use errors::{DeviceError, PlaybackError};
pub use events::PlaybackEvent;
pub use manager::{PlaybackManager, ToggleOutcome};
pub use value_objects::PlaybackUrl;
