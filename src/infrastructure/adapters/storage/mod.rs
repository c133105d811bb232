//! Storage Adapters - 音频文件存储

mod clip_storage;

pub use clip_storage::FileClipStorage;
