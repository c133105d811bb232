//! Voset - 语音集 TTS 工作站
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Set Context: 语音集与消息管理上下文
//! - Voice Context: 内置音色目录
//! - Playback Context: 播放管理器（单一输出设备 + URL 缓存）
//!
//! 应用层 (application/):
//! - Ports: 端口定义（Repositories, AudioStorage, SpeechEngine, GenerationTasks, ApiKeyVault）
//! - Commands: CQRS 命令处理器
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API + WebSocket
//! - Memory: GenerationTasks, PlaybackSessions 内存实现
//! - Worker: GenerateWorker 后台任务处理
//! - Persistence: SQLite 存储
//! - Adapters: Speech Client, Clip Storage, Key Vault, Playback Device
//! - Events: WebSocket 事件发布

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
