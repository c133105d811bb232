//! Memory Layer - In-Memory State Management

mod generation_tasks;
mod playback_sessions;

pub use generation_tasks::InMemoryGenerationTasks;
pub use playback_sessions::{ActivePlayback, OpenedPlayback, PlaybackSessions};
