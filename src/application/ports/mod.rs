//! Application Ports - 出站端口定义
//!
//! 六边形架构的端口层，具体实现在 infrastructure 层

mod audio_storage;
mod generation_tasks;
mod key_vault;
mod repositories;
mod speech_engine;

pub use audio_storage::{AudioStorageError, AudioStoragePort};
pub use generation_tasks::{
    GenerationState, GenerationTask, GenerationTaskError, GenerationTaskPort,
};
pub use key_vault::{ApiKeyVaultError, ApiKeyVaultPort};
pub use repositories::{
    CredentialRecord, GenerationMeta, MessageRecord, RepositoryError, SetRecord,
    CredentialRepositoryPort, MessageRepositoryPort, SetRepositoryPort,
};
pub use speech_engine::{SpeechEnginePort, SpeechError, SynthesisRequest, SynthesisResponse};
