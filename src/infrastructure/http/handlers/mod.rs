//! HTTP Handlers

mod audio;
mod key;
mod message;
mod ping;
mod playback;
mod set;
mod websocket;

pub use audio::*;
pub use key::*;
pub use message::*;
pub use ping::*;
pub use playback::*;
pub use set::*;
pub use websocket::*;
