//! Query Handlers

mod key_handlers;
mod message_handlers;
mod playback_handlers;
mod set_handlers;
mod voice_handlers;

pub use key_handlers::{ApiKeyStatusHandler, ApiKeyStatusResponse};
pub use message_handlers::{
    GetMessageHandler, GenerationMetaResponse, ListMessagesHandler, MessageResponse,
    ResolveAudioUrlHandler, ResolvedAudioUrl,
};
pub use playback_handlers::{GetPlaybackStateHandler, PlaybackStateResponse};
pub use set_handlers::{
    GetSetAudioFilesHandler, GetSetHandler, ListSetsHandler, SetAudioFileResponse, SetResponse,
};
pub use voice_handlers::{ListVoicesHandler, VoiceResponse};
