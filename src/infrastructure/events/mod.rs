//! Events Layer - WebSocket Event Publishing

mod publisher;

pub use publisher::{EventPublisher, WsEvent};
