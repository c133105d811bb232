//! Command Handlers

mod generation_handlers;
mod key_handlers;
mod message_handlers;
mod playback_handlers;
mod set_handlers;

pub use generation_handlers::{QueryGenerationStatusHandler, SubmitGenerationHandler};
pub use key_handlers::StoreApiKeyHandler;
pub use message_handlers::{CreateMessageHandler, DeleteMessageHandler, UpdateMessageHandler};
pub use playback_handlers::{
    resolve_clip_url, ClosePlaybackHandler, OpenPlaybackHandler, PausePlaybackHandler,
    PrefetchPlaybackHandler, SeekPlaybackHandler, TogglePlaybackHandler,
};
pub use set_handlers::{CreateSetHandler, DeleteSetHandler, UpdateSetHandler};
