//! Voice Context - 音色限界上下文
//!
//! 职责:
//! - 内置音色目录（上游服务的固定音色，不落库）
//! - 音色标识校验

pub mod catalog;
mod value_objects;

pub use catalog::CatalogVoice;
pub use value_objects::VoiceId;
