//! Probe Adapters - 音频元数据解析

mod mpeg_probe;

pub use mpeg_probe::{mpeg_duration_ms, mpeg_duration_secs};
