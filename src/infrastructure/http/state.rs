//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    ClosePlaybackHandler, CreateMessageHandler, CreateSetHandler, DeleteMessageHandler,
    DeleteSetHandler, OpenPlaybackHandler, PausePlaybackHandler, PrefetchPlaybackHandler,
    QueryGenerationStatusHandler, SeekPlaybackHandler, StoreApiKeyHandler,
    SubmitGenerationHandler, TogglePlaybackHandler, UpdateMessageHandler, UpdateSetHandler,
    // Query handlers
    ApiKeyStatusHandler, GetMessageHandler, GetPlaybackStateHandler, GetSetAudioFilesHandler,
    GetSetHandler, ListMessagesHandler, ListSetsHandler, ListVoicesHandler,
    ResolveAudioUrlHandler,
    // Ports
    ApiKeyVaultPort, AudioStoragePort, GenerationTaskPort, MessageRepositoryPort,
    SetRepositoryPort,
};
use crate::infrastructure::events::EventPublisher;
use crate::infrastructure::memory::PlaybackSessions;

/// 应用状态
///
/// GenerationTasks 与 PlaybackSessions 为内存实现
pub struct AppState {
    // ========== Ports ==========
    pub set_repo: Arc<dyn SetRepositoryPort>,
    pub message_repo: Arc<dyn MessageRepositoryPort>,
    pub audio_storage: Arc<dyn AudioStoragePort>,
    pub key_vault: Arc<dyn ApiKeyVaultPort>,
    pub generation_tasks: Arc<dyn GenerationTaskPort>,
    pub playback_sessions: Arc<PlaybackSessions>,
    pub event_publisher: Arc<EventPublisher>,

    // ========== Command Handlers ==========
    pub create_set_handler: CreateSetHandler,
    pub update_set_handler: UpdateSetHandler,
    pub delete_set_handler: DeleteSetHandler,
    pub create_message_handler: CreateMessageHandler,
    pub update_message_handler: UpdateMessageHandler,
    pub delete_message_handler: DeleteMessageHandler,
    pub submit_generation_handler: SubmitGenerationHandler,
    pub query_generation_status_handler: QueryGenerationStatusHandler,
    pub store_api_key_handler: StoreApiKeyHandler,
    pub open_playback_handler: OpenPlaybackHandler,
    pub toggle_playback_handler: TogglePlaybackHandler,
    pub prefetch_playback_handler: PrefetchPlaybackHandler,
    pub pause_playback_handler: PausePlaybackHandler,
    pub seek_playback_handler: SeekPlaybackHandler,
    pub close_playback_handler: ClosePlaybackHandler,

    // ========== Query Handlers ==========
    pub get_set_handler: GetSetHandler,
    pub list_sets_handler: ListSetsHandler,
    pub get_set_audio_files_handler: GetSetAudioFilesHandler,
    pub get_message_handler: GetMessageHandler,
    pub list_messages_handler: ListMessagesHandler,
    pub resolve_audio_url_handler: ResolveAudioUrlHandler,
    pub list_voices_handler: ListVoicesHandler,
    pub api_key_status_handler: ApiKeyStatusHandler,
    pub get_playback_state_handler: GetPlaybackStateHandler,
}

impl AppState {
    /// 创建应用状态
    ///
    /// base_url: 对外可达的服务地址，播放 URL 以此为前缀
    pub fn new(
        set_repo: Arc<dyn SetRepositoryPort>,
        message_repo: Arc<dyn MessageRepositoryPort>,
        audio_storage: Arc<dyn AudioStoragePort>,
        key_vault: Arc<dyn ApiKeyVaultPort>,
        generation_tasks: Arc<dyn GenerationTaskPort>,
        playback_sessions: Arc<PlaybackSessions>,
        event_publisher: Arc<EventPublisher>,
        base_url: String,
    ) -> Self {
        Self {
            // Ports
            set_repo: set_repo.clone(),
            message_repo: message_repo.clone(),
            audio_storage: audio_storage.clone(),
            key_vault: key_vault.clone(),
            generation_tasks: generation_tasks.clone(),
            playback_sessions: playback_sessions.clone(),
            event_publisher: event_publisher.clone(),

            // Command handlers
            create_set_handler: CreateSetHandler::new(
                set_repo.clone(),
                message_repo.clone(),
                event_publisher.clone(),
            ),
            update_set_handler: UpdateSetHandler::new(set_repo.clone(), event_publisher.clone()),
            delete_set_handler: DeleteSetHandler::new(
                set_repo.clone(),
                message_repo.clone(),
                audio_storage.clone(),
                generation_tasks.clone(),
                event_publisher.clone(),
            ),
            create_message_handler: CreateMessageHandler::new(
                set_repo.clone(),
                message_repo.clone(),
                event_publisher.clone(),
            ),
            update_message_handler: UpdateMessageHandler::new(
                message_repo.clone(),
                event_publisher.clone(),
            ),
            delete_message_handler: DeleteMessageHandler::new(
                set_repo.clone(),
                message_repo.clone(),
                audio_storage.clone(),
                generation_tasks.clone(),
                event_publisher.clone(),
            ),
            submit_generation_handler: SubmitGenerationHandler::new(
                set_repo.clone(),
                message_repo.clone(),
                key_vault.clone(),
                generation_tasks.clone(),
                event_publisher.clone(),
            ),
            query_generation_status_handler: QueryGenerationStatusHandler::new(
                generation_tasks.clone(),
            ),
            store_api_key_handler: StoreApiKeyHandler::new(key_vault.clone()),
            open_playback_handler: OpenPlaybackHandler::new(
                set_repo.clone(),
                playback_sessions.clone(),
                event_publisher.clone(),
            ),
            toggle_playback_handler: TogglePlaybackHandler::new(
                message_repo.clone(),
                audio_storage.clone(),
                playback_sessions.clone(),
                base_url.clone(),
            ),
            prefetch_playback_handler: PrefetchPlaybackHandler::new(
                message_repo.clone(),
                audio_storage.clone(),
                playback_sessions.clone(),
                base_url.clone(),
            ),
            pause_playback_handler: PausePlaybackHandler::new(playback_sessions.clone()),
            seek_playback_handler: SeekPlaybackHandler::new(playback_sessions.clone()),
            close_playback_handler: ClosePlaybackHandler::new(
                playback_sessions.clone(),
                event_publisher.clone(),
            ),

            // Query handlers
            get_set_handler: GetSetHandler::new(set_repo.clone()),
            list_sets_handler: ListSetsHandler::new(set_repo.clone()),
            get_set_audio_files_handler: GetSetAudioFilesHandler::new(
                set_repo.clone(),
                message_repo.clone(),
                audio_storage.clone(),
                base_url.clone(),
            ),
            get_message_handler: GetMessageHandler::new(message_repo.clone()),
            list_messages_handler: ListMessagesHandler::new(
                set_repo.clone(),
                message_repo.clone(),
            ),
            resolve_audio_url_handler: ResolveAudioUrlHandler::new(
                message_repo.clone(),
                audio_storage.clone(),
                base_url,
            ),
            list_voices_handler: ListVoicesHandler::new(),
            api_key_status_handler: ApiKeyStatusHandler::new(key_vault),
            get_playback_state_handler: GetPlaybackStateHandler::new(playback_sessions),
        }
    }
}
