//! Playback Sessions - 播放会话槽位
//!
//! 同一 UI 表面同一时刻只允许一个播放会话存活：
//! open 会先拆掉旧会话（清缓存、卸载设备源），再配一个新设备 + 新管理器。

use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::playback::{DeviceError, PlaybackDevice, PlaybackDeviceFactory, PlaybackManager};

/// 活跃播放会话
struct Slot {
    playback_id: String,
    set_id: Uuid,
    manager: Arc<PlaybackManager>,
    device: Arc<dyn PlaybackDevice>,
}

/// open 的结果
pub struct OpenedPlayback {
    pub playback_id: String,
    pub set_id: Uuid,
    pub manager: Arc<PlaybackManager>,
    pub device: Arc<dyn PlaybackDevice>,
    /// 被替换掉的上一个会话（如有）
    pub replaced_playback_id: Option<String>,
}

/// 活跃会话快照
pub struct ActivePlayback {
    pub playback_id: String,
    pub set_id: Uuid,
    pub manager: Arc<PlaybackManager>,
    pub device: Arc<dyn PlaybackDevice>,
}

/// 播放会话管理器
pub struct PlaybackSessions {
    device_factory: Arc<dyn PlaybackDeviceFactory>,
    active: Mutex<Option<Slot>>,
}

impl PlaybackSessions {
    pub fn new(device_factory: Arc<dyn PlaybackDeviceFactory>) -> Self {
        Self {
            device_factory,
            active: Mutex::new(None),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 打开新会话；已有会话先被关闭
    pub fn open(&self, set_id: Uuid) -> Result<OpenedPlayback, DeviceError> {
        let device = self.device_factory.create()?;
        let manager = Arc::new(PlaybackManager::new(device.clone()));
        let playback_id = Uuid::new_v4().to_string();

        let mut active = self.active.lock();
        let replaced_playback_id = active.take().map(|slot| {
            slot.manager.clear_cache();
            slot.playback_id
        });

        *active = Some(Slot {
            playback_id: playback_id.clone(),
            set_id,
            manager: manager.clone(),
            device: device.clone(),
        });

        tracing::info!(
            playback_id = %playback_id,
            set_id = %set_id,
            "Playback slot occupied"
        );

        Ok(OpenedPlayback {
            playback_id,
            set_id,
            manager,
            device,
            replaced_playback_id,
        })
    }

    /// 当前活跃会话
    pub fn active(&self) -> Option<ActivePlayback> {
        self.active.lock().as_ref().map(|slot| ActivePlayback {
            playback_id: slot.playback_id.clone(),
            set_id: slot.set_id,
            manager: slot.manager.clone(),
            device: slot.device.clone(),
        })
    }

    /// 指定会话是否活跃
    pub fn is_active(&self, playback_id: &str) -> bool {
        self.active
            .lock()
            .as_ref()
            .map(|slot| slot.playback_id == playback_id)
            .unwrap_or(false)
    }

    /// 关闭当前会话；幂等
    pub fn close(&self) -> Option<String> {
        let slot = self.active.lock().take()?;
        slot.manager.clear_cache();
        Some(slot.playback_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::playback::{DeviceEvent, PlaybackUrl};
    use async_trait::async_trait;
    use tokio::sync::broadcast;

    struct NullDevice {
        events: broadcast::Sender<DeviceEvent>,
    }

    impl NullDevice {
        fn new() -> Arc<Self> {
            let (events, _) = broadcast::channel(8);
            Arc::new(Self { events })
        }
    }

    #[async_trait]
    impl PlaybackDevice for NullDevice {
        async fn load(&self, _url: &PlaybackUrl) -> Result<(), DeviceError> {
            Ok(())
        }
        fn preload(&self, _url: &PlaybackUrl) {}
        async fn play(&self) -> Result<(), DeviceError> {
            Ok(())
        }
        fn pause(&self) {}
        fn position(&self) -> f64 {
            0.0
        }
        fn seek(&self, _seconds: f64) {}
        fn duration(&self) -> Option<f64> {
            None
        }
        fn is_paused(&self) -> bool {
            true
        }
        fn has_ended(&self) -> bool {
            false
        }
        fn unload(&self) {}
        fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
            self.events.subscribe()
        }
    }

    struct NullFactory;

    impl PlaybackDeviceFactory for NullFactory {
        fn create(&self) -> Result<Arc<dyn PlaybackDevice>, DeviceError> {
            Ok(NullDevice::new())
        }
    }

    #[tokio::test]
    async fn test_open_replaces_previous_session() {
        let sessions = PlaybackSessions::new(Arc::new(NullFactory));

        let first = sessions.open(Uuid::new_v4()).unwrap();
        assert_eq!(first.replaced_playback_id, None);
        assert!(sessions.is_active(&first.playback_id));

        let second = sessions.open(Uuid::new_v4()).unwrap();
        assert_eq!(
            second.replaced_playback_id.as_deref(),
            Some(first.playback_id.as_str())
        );
        assert!(!sessions.is_active(&first.playback_id));
        assert!(sessions.is_active(&second.playback_id));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let sessions = PlaybackSessions::new(Arc::new(NullFactory));

        assert_eq!(sessions.close(), None);

        let opened = sessions.open(Uuid::new_v4()).unwrap();
        assert_eq!(sessions.close(), Some(opened.playback_id));
        assert_eq!(sessions.close(), None);
        assert!(sessions.active().is_none());
    }
}
