//! Playback Manager - 单设备播放管理器
//!
//! 居中调度一组消息音频在单一输出设备上的切换/暂停/续播，
//! 记忆化播放 URL 解析结果，并把设备状态以事件形式转发给订阅方。
//!
//! 并发模型：操作由 UI/HTTP 事件驱动逐次调用；切换消息的解析与加载
//! 之间存在挂起点，使用单调递增的切换序号保证"最后一次切换胜出"——
//! 迟到的慢速解析只保留缓存写入，不触碰设备与当前消息。

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::{DeviceEvent, PlaybackDevice, PlaybackError, PlaybackEvent, PlaybackUrl};
use crate::domain::set::MessageId;

/// 事件通道容量
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// play_or_toggle 的裁决结果
///
/// 仅作信息返回；解析缺失(Unavailable)与迟到切换(Superseded)都不是错误，
/// 且不产生任何状态变更。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// 同一消息已播完，归零重播
    Restarted,
    /// 同一消息处于暂停态，恢复播放
    Resumed,
    /// 同一消息正在播放，转为暂停
    Paused,
    /// 切换到新消息并从头播放
    Switched,
    /// 该消息尚无可播放音频
    Unavailable,
    /// 解析完成时已有更新的切换发生，本次结果被丢弃
    Superseded,
}

impl ToggleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToggleOutcome::Restarted => "restarted",
            ToggleOutcome::Resumed => "resumed",
            ToggleOutcome::Paused => "paused",
            ToggleOutcome::Switched => "switched",
            ToggleOutcome::Unavailable => "unavailable",
            ToggleOutcome::Superseded => "superseded",
        }
    }
}

/// 播放管理器
///
/// 不变量:
/// - 设备同一时刻至多加载一条消息；切换隐式卸载前一条
/// - URL 缓存只被 clear_cache 清空，命中时绝不再次解析
/// - 缓存写入先于 current 更新，current 更新先于设备 load，load 先于 play
pub struct PlaybackManager {
    device: Arc<dyn PlaybackDevice>,
    current: Mutex<Option<MessageId>>,
    url_cache: DashMap<MessageId, PlaybackUrl>,
    switch_serial: AtomicU64,
    events: broadcast::Sender<PlaybackEvent>,
    forwarder: JoinHandle<()>,
}

impl PlaybackManager {
    /// 创建管理器并接管设备事件转发
    ///
    /// 设备自此由本管理器独占，直到管理器销毁。
    pub fn new(device: Arc<dyn PlaybackDevice>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let mut device_rx = device.subscribe();
        let events_tx = events.clone();
        let forwarder = tokio::spawn(async move {
            loop {
                match device_rx.recv().await {
                    Ok(event) => {
                        let _ = events_tx.send(map_device_event(event));
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Playback event forwarder lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Self {
            device,
            current: Mutex::new(None),
            url_cache: DashMap::new(),
            switch_serial: AtomicU64::new(0),
            events,
            forwarder,
        }
    }

    /// 订阅播放状态事件
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    /// 当前加载到设备的消息（不一定在播放）
    pub fn current_message_id(&self) -> Option<MessageId> {
        *self.current.lock()
    }

    /// 播放/暂停裁决
    ///
    /// 决策表自上而下，首个命中生效:
    /// 1. 同一消息且已播完 → 归零重播
    /// 2. 同一消息且暂停 → 恢复（不归零）
    /// 3. 同一消息且在播 → 暂停
    /// 4. 不同消息 → 解析 URL（缓存命中免解析），缓存，切换，开始播放
    ///
    /// resolver 返回 Ok(None) 表示"尚无可播放音频"：不做任何状态变更。
    /// resolver 或设备的失败原样向上传播，失败发生在状态变更之前。
    pub async fn play_or_toggle<F, Fut>(
        &self,
        message_id: MessageId,
        resolve_url: F,
    ) -> Result<ToggleOutcome, PlaybackError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<PlaybackUrl>, PlaybackError>>,
    {
        if self.current_message_id() == Some(message_id) {
            if self.device.has_ended() {
                self.device.seek(0.0);
                self.device.play().await?;
                return Ok(ToggleOutcome::Restarted);
            }

            if self.device.is_paused() {
                self.device.play().await?;
                return Ok(ToggleOutcome::Resumed);
            }

            self.device.pause();
            return Ok(ToggleOutcome::Paused);
        }

        // 切换消息：捕获切换序号，解析完成后只有最新的切换允许触碰设备
        let token = self.switch_serial.fetch_add(1, Ordering::SeqCst) + 1;

        let url = match self.cached_url(&message_id) {
            Some(url) => url,
            None => match resolve_url().await? {
                Some(url) => {
                    self.url_cache.insert(message_id, url.clone());
                    url
                }
                None => return Ok(ToggleOutcome::Unavailable),
            },
        };

        if self.switch_serial.load(Ordering::SeqCst) != token {
            tracing::debug!(%message_id, "Discarding stale switch resolution");
            return Ok(ToggleOutcome::Superseded);
        }

        *self.current.lock() = Some(message_id);
        self.device.load(&url).await?;
        self.device.play().await?;

        Ok(ToggleOutcome::Switched)
    }

    /// 预取消息的播放 URL 并通知设备带外预加载
    ///
    /// 已缓存则为幂等 no-op；解析缺失同样静默返回。不影响当前播放。
    pub async fn prefetch<F, Fut>(
        &self,
        message_id: MessageId,
        resolve_url: F,
    ) -> Result<(), PlaybackError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<PlaybackUrl>, PlaybackError>>,
    {
        if self.url_cache.contains_key(&message_id) {
            return Ok(());
        }

        let Some(url) = resolve_url().await? else {
            return Ok(());
        };

        self.url_cache.insert(message_id, url.clone());
        self.device.preload(&url);

        Ok(())
    }

    /// 暂停；未加载任何消息时为 no-op
    pub fn pause(&self) {
        if self.current_message_id().is_some() {
            self.device.pause();
        }
    }

    /// 跳转到指定位置（秒）；不改变播放/暂停状态，越界由设备收敛
    pub fn seek(&self, seconds: f64) {
        self.device.seek(seconds);
    }

    /// 清空 URL 缓存、重置当前消息并卸载设备源
    ///
    /// 在拥有方上下文销毁（离开语音集详情）时调用；幂等。
    pub fn clear_cache(&self) {
        self.url_cache.clear();
        *self.current.lock() = None;
        self.device.unload();
    }

    fn cached_url(&self, message_id: &MessageId) -> Option<PlaybackUrl> {
        self.url_cache.get(message_id).map(|e| e.value().clone())
    }
}

impl Drop for PlaybackManager {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

fn map_device_event(event: DeviceEvent) -> PlaybackEvent {
    match event {
        DeviceEvent::TimeUpdate(seconds) => PlaybackEvent::Progress { seconds },
        DeviceEvent::LoadedMetadata(seconds) => PlaybackEvent::DurationKnown { seconds },
        DeviceEvent::Ended => PlaybackEvent::Ended,
        DeviceEvent::Play => PlaybackEvent::Started,
        DeviceEvent::Pause => PlaybackEvent::Paused,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::playback::DeviceError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::time::Duration;

    /// 脚本化设备：记录调用并允许测试直接摆放状态
    struct ScriptedDevice {
        loaded: Mutex<Option<PlaybackUrl>>,
        preloaded: Mutex<Vec<PlaybackUrl>>,
        position: Mutex<f64>,
        paused: AtomicBool,
        ended: AtomicBool,
        play_calls: AtomicUsize,
        pause_calls: AtomicUsize,
        seek_calls: AtomicUsize,
        events: broadcast::Sender<DeviceEvent>,
    }

    impl ScriptedDevice {
        fn new() -> Arc<Self> {
            let (events, _) = broadcast::channel(64);
            Arc::new(Self {
                loaded: Mutex::new(None),
                preloaded: Mutex::new(Vec::new()),
                position: Mutex::new(0.0),
                paused: AtomicBool::new(true),
                ended: AtomicBool::new(false),
                play_calls: AtomicUsize::new(0),
                pause_calls: AtomicUsize::new(0),
                seek_calls: AtomicUsize::new(0),
                events,
            })
        }

        fn loaded_url(&self) -> Option<PlaybackUrl> {
            self.loaded.lock().clone()
        }

        fn set_position(&self, seconds: f64) {
            *self.position.lock() = seconds;
        }

        fn mark_ended(&self) {
            self.ended.store(true, Ordering::SeqCst);
            self.paused.store(true, Ordering::SeqCst);
        }

        fn emit(&self, event: DeviceEvent) {
            let _ = self.events.send(event);
        }
    }

    #[async_trait]
    impl PlaybackDevice for ScriptedDevice {
        async fn load(&self, url: &PlaybackUrl) -> Result<(), DeviceError> {
            *self.loaded.lock() = Some(url.clone());
            *self.position.lock() = 0.0;
            self.ended.store(false, Ordering::SeqCst);
            self.paused.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn preload(&self, url: &PlaybackUrl) {
            self.preloaded.lock().push(url.clone());
        }

        async fn play(&self) -> Result<(), DeviceError> {
            self.play_calls.fetch_add(1, Ordering::SeqCst);
            self.paused.store(false, Ordering::SeqCst);
            self.ended.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn pause(&self) {
            self.pause_calls.fetch_add(1, Ordering::SeqCst);
            self.paused.store(true, Ordering::SeqCst);
        }

        fn position(&self) -> f64 {
            *self.position.lock()
        }

        fn seek(&self, seconds: f64) {
            self.seek_calls.fetch_add(1, Ordering::SeqCst);
            *self.position.lock() = seconds;
        }

        fn duration(&self) -> Option<f64> {
            self.loaded.lock().as_ref().map(|_| 10.0)
        }

        fn is_paused(&self) -> bool {
            self.paused.load(Ordering::SeqCst)
        }

        fn has_ended(&self) -> bool {
            self.ended.load(Ordering::SeqCst)
        }

        fn unload(&self) {
            *self.loaded.lock() = None;
            self.paused.store(true, Ordering::SeqCst);
            self.ended.store(false, Ordering::SeqCst);
            *self.position.lock() = 0.0;
        }

        fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
            self.events.subscribe()
        }
    }

    fn url(s: &str) -> PlaybackUrl {
        PlaybackUrl::new(s).unwrap()
    }

    /// 计数解析器：记录调用次数并返回固定 URL
    fn counting_resolver(
        calls: Arc<AtomicUsize>,
        result: Option<PlaybackUrl>,
    ) -> impl FnOnce() -> std::future::Ready<Result<Option<PlaybackUrl>, PlaybackError>> {
        move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(Ok(result))
        }
    }

    fn failing_resolver(
    ) -> impl FnOnce() -> std::future::Ready<Result<Option<PlaybackUrl>, PlaybackError>> {
        || std::future::ready(Err(PlaybackError::Resolver("boom".to_string())))
    }

    #[tokio::test]
    async fn test_toggle_same_message_invokes_resolver_once() {
        let device = ScriptedDevice::new();
        let manager = PlaybackManager::new(device.clone());
        let id = MessageId::new();
        let calls = Arc::new(AtomicUsize::new(0));

        // 首次：切换并播放
        let outcome = manager
            .play_or_toggle(id, counting_resolver(calls.clone(), Some(url("http://a"))))
            .await
            .unwrap();
        assert_eq!(outcome, ToggleOutcome::Switched);
        assert!(!device.is_paused());

        // 第二次：播放中 → 暂停，解析器不再被调用
        let outcome = manager
            .play_or_toggle(id, counting_resolver(calls.clone(), Some(url("http://a"))))
            .await
            .unwrap();
        assert_eq!(outcome, ToggleOutcome::Paused);
        assert!(device.is_paused());

        // 第三次：暂停 → 恢复，不归零
        let outcome = manager
            .play_or_toggle(id, counting_resolver(calls.clone(), Some(url("http://a"))))
            .await
            .unwrap();
        assert_eq!(outcome, ToggleOutcome::Resumed);
        assert!(!device.is_paused());
        assert_eq!(device.seek_calls.load(Ordering::SeqCst), 0);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_reuse_across_play_and_prefetch() {
        let device = ScriptedDevice::new();
        let manager = PlaybackManager::new(device.clone());
        let id = MessageId::new();
        let other = MessageId::new();
        let calls = Arc::new(AtomicUsize::new(0));

        manager
            .prefetch(id, counting_resolver(calls.clone(), Some(url("http://a"))))
            .await
            .unwrap();
        manager
            .prefetch(id, counting_resolver(calls.clone(), Some(url("http://a"))))
            .await
            .unwrap();
        manager
            .play_or_toggle(id, counting_resolver(calls.clone(), Some(url("http://a"))))
            .await
            .unwrap();

        // 切走再切回，仍然命中缓存
        manager
            .play_or_toggle(
                other,
                counting_resolver(Arc::new(AtomicUsize::new(0)), Some(url("http://b"))),
            )
            .await
            .unwrap();
        manager
            .play_or_toggle(id, counting_resolver(calls.clone(), Some(url("http://a"))))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // clear_cache 之后重新解析
        manager.clear_cache();
        manager
            .play_or_toggle(id, counting_resolver(calls.clone(), Some(url("http://a"))))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_switch_resets_position() {
        let device = ScriptedDevice::new();
        let manager = PlaybackManager::new(device.clone());
        let id_a = MessageId::new();
        let id_b = MessageId::new();

        manager
            .play_or_toggle(
                id_a,
                counting_resolver(Arc::new(AtomicUsize::new(0)), Some(url("http://a"))),
            )
            .await
            .unwrap();
        device.set_position(5.5);

        let outcome = manager
            .play_or_toggle(
                id_b,
                counting_resolver(Arc::new(AtomicUsize::new(0)), Some(url("http://b"))),
            )
            .await
            .unwrap();

        assert_eq!(outcome, ToggleOutcome::Switched);
        assert_eq!(device.position(), 0.0);
        assert_eq!(device.loaded_url(), Some(url("http://b")));
        assert_eq!(manager.current_message_id(), Some(id_b));
    }

    #[tokio::test]
    async fn test_resolution_miss_is_silent_noop() {
        let device = ScriptedDevice::new();
        let manager = PlaybackManager::new(device.clone());
        let id_a = MessageId::new();
        let id_b = MessageId::new();

        manager
            .play_or_toggle(
                id_a,
                counting_resolver(Arc::new(AtomicUsize::new(0)), Some(url("http://a"))),
            )
            .await
            .unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let outcome = manager
            .play_or_toggle(id_b, counting_resolver(calls.clone(), None))
            .await
            .unwrap();

        assert_eq!(outcome, ToggleOutcome::Unavailable);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // 状态保持切换前的样子
        assert_eq!(manager.current_message_id(), Some(id_a));
        assert_eq!(device.loaded_url(), Some(url("http://a")));

        // 缓存未被污染：下次仍会解析
        let outcome = manager
            .play_or_toggle(id_b, counting_resolver(calls.clone(), Some(url("http://b"))))
            .await
            .unwrap();
        assert_eq!(outcome, ToggleOutcome::Switched);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_restart_after_end_without_resolver() {
        let device = ScriptedDevice::new();
        let manager = PlaybackManager::new(device.clone());
        let id = MessageId::new();

        manager
            .play_or_toggle(
                id,
                counting_resolver(Arc::new(AtomicUsize::new(0)), Some(url("http://a"))),
            )
            .await
            .unwrap();
        device.set_position(10.0);
        device.mark_ended();

        let calls = Arc::new(AtomicUsize::new(0));
        let outcome = manager
            .play_or_toggle(id, counting_resolver(calls.clone(), Some(url("http://a"))))
            .await
            .unwrap();

        assert_eq!(outcome, ToggleOutcome::Restarted);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(device.position(), 0.0);
        assert!(!device.is_paused());
    }

    #[tokio::test]
    async fn test_prefetch_does_not_interfere_with_playback() {
        let device = ScriptedDevice::new();
        let manager = PlaybackManager::new(device.clone());
        let id_a = MessageId::new();
        let id_b = MessageId::new();

        manager
            .play_or_toggle(
                id_a,
                counting_resolver(Arc::new(AtomicUsize::new(0)), Some(url("http://a"))),
            )
            .await
            .unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        manager
            .prefetch(id_b, counting_resolver(calls.clone(), Some(url("http://b"))))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(manager.current_message_id(), Some(id_a));
        assert!(!device.is_paused());
        assert_eq!(device.loaded_url(), Some(url("http://a")));
        assert_eq!(device.preloaded.lock().clone(), vec![url("http://b")]);

        // 预取已填充缓存：随后的切换不得再调用解析器
        let outcome = manager
            .play_or_toggle(id_b, failing_resolver())
            .await
            .unwrap();
        assert_eq!(outcome, ToggleOutcome::Switched);
        assert_eq!(device.loaded_url(), Some(url("http://b")));
    }

    #[tokio::test]
    async fn test_resolver_error_propagates_without_state_change() {
        let device = ScriptedDevice::new();
        let manager = PlaybackManager::new(device.clone());
        let id_a = MessageId::new();
        let id_b = MessageId::new();

        manager
            .play_or_toggle(
                id_a,
                counting_resolver(Arc::new(AtomicUsize::new(0)), Some(url("http://a"))),
            )
            .await
            .unwrap();

        let result = manager.play_or_toggle(id_b, failing_resolver()).await;
        assert!(matches!(result, Err(PlaybackError::Resolver(_))));
        assert_eq!(manager.current_message_id(), Some(id_a));
        assert_eq!(device.loaded_url(), Some(url("http://a")));
    }

    #[tokio::test]
    async fn test_pause_is_noop_with_nothing_loaded() {
        let device = ScriptedDevice::new();
        let manager = PlaybackManager::new(device.clone());

        manager.pause();
        assert_eq!(device.pause_calls.load(Ordering::SeqCst), 0);

        manager
            .play_or_toggle(
                MessageId::new(),
                counting_resolver(Arc::new(AtomicUsize::new(0)), Some(url("http://a"))),
            )
            .await
            .unwrap();
        manager.pause();
        assert_eq!(device.pause_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clear_cache_is_idempotent() {
        let device = ScriptedDevice::new();
        let manager = PlaybackManager::new(device.clone());
        let id = MessageId::new();

        manager
            .play_or_toggle(
                id,
                counting_resolver(Arc::new(AtomicUsize::new(0)), Some(url("http://a"))),
            )
            .await
            .unwrap();

        manager.clear_cache();
        manager.clear_cache();

        assert_eq!(manager.current_message_id(), None);
        assert_eq!(device.loaded_url(), None);
    }

    #[tokio::test]
    async fn test_stale_switch_resolution_is_discarded() {
        let device = ScriptedDevice::new();
        let manager = Arc::new(PlaybackManager::new(device.clone()));
        let id_slow = MessageId::new();
        let id_fast = MessageId::new();

        let (gate_tx, gate_rx) = tokio::sync::oneshot::channel::<()>();

        // 第一次切换卡在解析上
        let slow_manager = manager.clone();
        let slow = tokio::spawn(async move {
            slow_manager
                .play_or_toggle(id_slow, move || async move {
                    let _ = gate_rx.await;
                    Ok(Some(PlaybackUrl::new("http://slow").unwrap()))
                })
                .await
        });

        // 让慢速切换先捕获它的序号
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        // 第二次切换先完成
        let outcome = manager
            .play_or_toggle(
                id_fast,
                counting_resolver(Arc::new(AtomicUsize::new(0)), Some(url("http://fast"))),
            )
            .await
            .unwrap();
        assert_eq!(outcome, ToggleOutcome::Switched);

        // 放行慢速解析：结果只进缓存，不覆盖设备
        gate_tx.send(()).unwrap();
        let outcome = slow.await.unwrap().unwrap();
        assert_eq!(outcome, ToggleOutcome::Superseded);

        assert_eq!(manager.current_message_id(), Some(id_fast));
        assert_eq!(device.loaded_url(), Some(url("http://fast")));

        // 迟到的 URL 已被记忆化：切换过去无需再次解析
        let outcome = manager
            .play_or_toggle(id_slow, failing_resolver())
            .await
            .unwrap();
        assert_eq!(outcome, ToggleOutcome::Switched);
        assert_eq!(device.loaded_url(), Some(url("http://slow")));
    }

    #[tokio::test]
    async fn test_device_events_are_forwarded() {
        let device = ScriptedDevice::new();
        let manager = PlaybackManager::new(device.clone());
        let mut events = manager.subscribe();

        device.emit(DeviceEvent::Play);
        device.emit(DeviceEvent::TimeUpdate(1.5));
        device.emit(DeviceEvent::LoadedMetadata(10.0));
        device.emit(DeviceEvent::Pause);
        device.emit(DeviceEvent::Ended);

        let mut received = Vec::new();
        for _ in 0..5 {
            let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
                .await
                .expect("event not forwarded")
                .unwrap();
            received.push(event);
        }

        assert_eq!(
            received,
            vec![
                PlaybackEvent::Started,
                PlaybackEvent::Progress { seconds: 1.5 },
                PlaybackEvent::DurationKnown { seconds: 10.0 },
                PlaybackEvent::Paused,
                PlaybackEvent::Ended,
            ]
        );
    }
}
