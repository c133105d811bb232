//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（SpeechEngine、Repository、AudioStorage、GenerationTasks、ApiKeyVault）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Generation commands
    GenerationStatusInfo,
    QueryGenerationStatusCommand,
    SubmitGenerationCommand,
    SubmitGenerationResponse,
    // Key commands
    StoreApiKeyCommand,
    StoreApiKeyResponse,
    // Message commands
    CreateMessageCommand,
    CreateMessageResponse,
    DeleteMessageCommand,
    DeleteMessageResponse,
    UpdateMessageCommand,
    UpdateMessageResponse,
    // Playback commands
    ClosePlaybackCommand,
    ClosePlaybackResponse,
    OpenPlaybackCommand,
    OpenPlaybackResponse,
    PausePlaybackCommand,
    PrefetchPlaybackCommand,
    SeekPlaybackCommand,
    TogglePlaybackCommand,
    TogglePlaybackResponse,
    // Set commands
    CreateSetCommand,
    CreateSetResponse,
    DeleteSetCommand,
    DeleteSetResponse,
    UpdateSetCommand,
    UpdateSetResponse,
    // Handlers
    handlers::{
        resolve_clip_url, ClosePlaybackHandler, CreateMessageHandler, CreateSetHandler,
        DeleteMessageHandler, DeleteSetHandler, OpenPlaybackHandler, PausePlaybackHandler,
        PrefetchPlaybackHandler, QueryGenerationStatusHandler, SeekPlaybackHandler,
        StoreApiKeyHandler, SubmitGenerationHandler, TogglePlaybackHandler, UpdateMessageHandler,
        UpdateSetHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Audio storage
    AudioStorageError,
    AudioStoragePort,
    // Generation tasks
    GenerationState,
    GenerationTask,
    GenerationTaskError,
    GenerationTaskPort,
    // Key vault
    ApiKeyVaultError,
    ApiKeyVaultPort,
    // Repositories
    CredentialRecord,
    CredentialRepositoryPort,
    GenerationMeta,
    MessageRecord,
    MessageRepositoryPort,
    RepositoryError,
    SetRecord,
    SetRepositoryPort,
    // Speech engine
    SpeechEnginePort,
    SpeechError,
    SynthesisRequest,
    SynthesisResponse,
};

pub use queries::{
    // Key queries
    ApiKeyStatusQuery,
    // Message queries
    GetMessageQuery,
    ListMessagesQuery,
    ResolveAudioUrlQuery,
    // Playback queries
    PlaybackStateQuery,
    // Set queries
    GetSetAudioFilesQuery,
    GetSetQuery,
    ListSetsQuery,
    // Voice queries
    ListVoicesQuery,
    // Handlers
    handlers::{
        ApiKeyStatusHandler, ApiKeyStatusResponse, GenerationMetaResponse,
        GetMessageHandler, GetPlaybackStateHandler, GetSetAudioFilesHandler, GetSetHandler,
        ListMessagesHandler, ListSetsHandler, ListVoicesHandler, MessageResponse,
        PlaybackStateResponse, ResolveAudioUrlHandler, ResolvedAudioUrl, SetAudioFileResponse,
        SetResponse, VoiceResponse,
    },
};
