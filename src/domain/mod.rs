//! Domain Layer - 领域层
//!
//! 包含三个限界上下文:
//! - Set Context: 语音集与消息管理
//! - Voice Context: 内置音色目录
//! - Playback Context: 播放管理器

pub mod playback;
pub mod set;
pub mod voice;
