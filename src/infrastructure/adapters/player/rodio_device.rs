//! Rodio Device - 宿主音频输出实现
//!
//! 实现 PlaybackDevice trait。rodio 的 OutputStream 不是 Send，
//! 因此流与 sink 活在专用音频线程里，句柄通过命令通道驱动它；
//! 播放状态镜像在原子量中供同步读取，进度/结束事件由线程的 tick 发出。

use dashmap::DashMap;
use reqwest::Client;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::playback::{
    DeviceError, DeviceEvent, PlaybackDevice, PlaybackDeviceFactory, PlaybackUrl,
};
use crate::infrastructure::adapters::probe::mpeg_duration_secs;

/// 播放进度 tick 间隔
const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// 音频线程启动超时
const SPAWN_TIMEOUT: Duration = Duration::from_secs(5);

/// 事件通道容量
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// 共享字节的 Cursor 包装（rodio 解码器要求 AsRef<[u8]>）
struct SharedBytes(Arc<Vec<u8>>);

impl AsRef<[u8]> for SharedBytes {
    fn as_ref(&self) -> &[u8] {
        self.0.as_slice()
    }
}

/// 发往音频线程的命令
enum PlayerCommand {
    Load(Arc<Vec<u8>>),
    Play,
    Pause,
    Seek(f64),
    Unload,
}

/// 音频线程镜像到句柄侧的状态
#[derive(Default)]
struct SharedState {
    loaded: AtomicBool,
    paused: AtomicBool,
    ended: AtomicBool,
    /// 播放位置（毫秒）
    position_ms: AtomicU64,
    /// 当前源时长（毫秒）；0 表示未知
    duration_ms: AtomicU64,
}

/// Rodio 输出设备句柄
pub struct RodioDevice {
    http: Client,
    commands: std_mpsc::Sender<PlayerCommand>,
    state: Arc<SharedState>,
    events: broadcast::Sender<DeviceEvent>,
    /// 预加载的音频字节（url → bytes）
    byte_cache: Arc<DashMap<String, Arc<Vec<u8>>>>,
}

impl RodioDevice {
    /// 启动音频线程并返回设备句柄
    pub fn spawn(http: Client) -> Result<Arc<Self>, DeviceError> {
        let (cmd_tx, cmd_rx) = std_mpsc::channel();
        let (ready_tx, ready_rx) = std_mpsc::channel();
        let state = Arc::new(SharedState::default());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let thread_state = state.clone();
        let thread_events = events.clone();
        std::thread::Builder::new()
            .name("voset-audio".to_string())
            .spawn(move || audio_thread(cmd_rx, ready_tx, thread_state, thread_events))
            .map_err(|e| DeviceError::OutputUnavailable(e.to_string()))?;

        match ready_rx.recv_timeout(SPAWN_TIMEOUT) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                return Err(DeviceError::OutputUnavailable(
                    "audio thread did not start in time".to_string(),
                ))
            }
        }

        Ok(Arc::new(Self {
            http,
            commands: cmd_tx,
            state,
            events,
            byte_cache: Arc::new(DashMap::new()),
        }))
    }

    fn send(&self, command: PlayerCommand) -> Result<(), DeviceError> {
        self.commands
            .send(command)
            .map_err(|_| DeviceError::OutputUnavailable("audio thread is gone".to_string()))
    }

    /// 取音频字节：预加载缓存命中则复用，否则现场拉取
    async fn fetch_bytes(&self, url: &PlaybackUrl) -> Result<Arc<Vec<u8>>, DeviceError> {
        if let Some(bytes) = self.byte_cache.get(url.as_str()) {
            return Ok(bytes.value().clone());
        }

        let bytes = fetch_url(&self.http, url).await?;
        self.byte_cache
            .insert(url.as_str().to_string(), bytes.clone());
        Ok(bytes)
    }
}

async fn fetch_url(http: &Client, url: &PlaybackUrl) -> Result<Arc<Vec<u8>>, DeviceError> {
    let response = http
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| DeviceError::FetchFailed(e.to_string()))?;

    if !response.status().is_success() {
        return Err(DeviceError::FetchFailed(format!(
            "HTTP {} for {}",
            response.status(),
            url
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| DeviceError::FetchFailed(e.to_string()))?;

    Ok(Arc::new(bytes.to_vec()))
}

#[async_trait]
impl PlaybackDevice for RodioDevice {
    async fn load(&self, url: &PlaybackUrl) -> Result<(), DeviceError> {
        let bytes = self.fetch_bytes(url).await?;
        let duration = mpeg_duration_secs(&bytes);

        self.send(PlayerCommand::Load(bytes))?;

        self.state.loaded.store(true, Ordering::SeqCst);
        self.state.paused.store(true, Ordering::SeqCst);
        self.state.ended.store(false, Ordering::SeqCst);
        self.state.position_ms.store(0, Ordering::SeqCst);
        self.state.duration_ms.store(
            duration.map(|d| (d * 1000.0) as u64).unwrap_or(0),
            Ordering::SeqCst,
        );

        if let Some(seconds) = duration {
            let _ = self.events.send(DeviceEvent::LoadedMetadata(seconds));
        }

        Ok(())
    }

    fn preload(&self, url: &PlaybackUrl) {
        if self.byte_cache.contains_key(url.as_str()) {
            return;
        }

        let http = self.http.clone();
        let cache = self.byte_cache.clone();
        let url = url.clone();
        tokio::spawn(async move {
            match fetch_url(&http, &url).await {
                Ok(bytes) => {
                    cache.insert(url.as_str().to_string(), bytes);
                    tracing::debug!(url = %url, "Clip preloaded");
                }
                Err(e) => {
                    // 预加载失败不致命，正式 load 时会重试
                    tracing::debug!(url = %url, error = %e, "Preload failed");
                }
            }
        });
    }

    async fn play(&self) -> Result<(), DeviceError> {
        if !self.state.loaded.load(Ordering::SeqCst) {
            return Err(DeviceError::NoSource);
        }

        self.send(PlayerCommand::Play)?;
        self.state.paused.store(false, Ordering::SeqCst);
        self.state.ended.store(false, Ordering::SeqCst);
        let _ = self.events.send(DeviceEvent::Play);

        Ok(())
    }

    fn pause(&self) {
        if self.send(PlayerCommand::Pause).is_ok() {
            self.state.paused.store(true, Ordering::SeqCst);
            let _ = self.events.send(DeviceEvent::Pause);
        }
    }

    fn position(&self) -> f64 {
        self.state.position_ms.load(Ordering::SeqCst) as f64 / 1000.0
    }

    fn seek(&self, seconds: f64) {
        // 越界交由 sink 自行收敛
        if self.send(PlayerCommand::Seek(seconds.max(0.0))).is_ok() {
            self.state
                .position_ms
                .store((seconds.max(0.0) * 1000.0) as u64, Ordering::SeqCst);
            if seconds <= 0.0 {
                self.state.ended.store(false, Ordering::SeqCst);
            }
        }
    }

    fn duration(&self) -> Option<f64> {
        match self.state.duration_ms.load(Ordering::SeqCst) {
            0 => None,
            ms => Some(ms as f64 / 1000.0),
        }
    }

    fn is_paused(&self) -> bool {
        self.state.paused.load(Ordering::SeqCst)
    }

    fn has_ended(&self) -> bool {
        self.state.ended.load(Ordering::SeqCst)
    }

    fn unload(&self) {
        let _ = self.send(PlayerCommand::Unload);
        self.byte_cache.clear();
        self.state.loaded.store(false, Ordering::SeqCst);
        self.state.paused.store(true, Ordering::SeqCst);
        self.state.ended.store(false, Ordering::SeqCst);
        self.state.position_ms.store(0, Ordering::SeqCst);
        self.state.duration_ms.store(0, Ordering::SeqCst);
    }

    fn subscribe(&self) -> broadcast::Receiver<DeviceEvent> {
        self.events.subscribe()
    }
}

/// 音频线程主循环
///
/// 拥有 OutputStream 与 Sink；命令通道关闭（所有句柄被 drop）即退出。
fn audio_thread(
    commands: std_mpsc::Receiver<PlayerCommand>,
    ready: std_mpsc::Sender<Result<(), DeviceError>>,
    state: Arc<SharedState>,
    events: broadcast::Sender<DeviceEvent>,
) {
    let (_stream, handle) = match rodio::OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            let _ = ready.send(Err(DeviceError::OutputUnavailable(e.to_string())));
            return;
        }
    };

    let sink = match rodio::Sink::try_new(&handle) {
        Ok(sink) => sink,
        Err(e) => {
            let _ = ready.send(Err(DeviceError::OutputUnavailable(e.to_string())));
            return;
        }
    };

    let _ = ready.send(Ok(()));
    tracing::info!("Audio thread started");

    let mut current: Option<Arc<Vec<u8>>> = None;

    loop {
        match commands.recv_timeout(TICK_INTERVAL) {
            Ok(PlayerCommand::Load(bytes)) => {
                sink.stop();
                if append_source(&sink, &bytes) {
                    sink.pause();
                    current = Some(bytes);
                } else {
                    current = None;
                    state.loaded.store(false, Ordering::SeqCst);
                }
            }
            Ok(PlayerCommand::Play) => {
                // 播完后的重播：队列已空，从字节重新挂源
                if sink.empty() {
                    if let Some(bytes) = &current {
                        append_source(&sink, bytes);
                    }
                }
                sink.play();
            }
            Ok(PlayerCommand::Pause) => {
                sink.pause();
            }
            Ok(PlayerCommand::Seek(seconds)) => {
                if sink.empty() {
                    if let Some(bytes) = &current {
                        append_source(&sink, bytes);
                        sink.pause();
                    }
                }
                if let Err(e) = sink.try_seek(Duration::from_secs_f64(seconds)) {
                    tracing::warn!(seconds, error = ?e, "Seek failed");
                }
            }
            Ok(PlayerCommand::Unload) => {
                sink.stop();
                current = None;
            }
            Err(std_mpsc::RecvTimeoutError::Timeout) => {
                // tick：镜像进度，检测播放结束
                if current.is_some() && state.loaded.load(Ordering::SeqCst) {
                    let playing = !state.paused.load(Ordering::SeqCst);
                    if playing && sink.empty() && !state.ended.load(Ordering::SeqCst) {
                        state.ended.store(true, Ordering::SeqCst);
                        state.paused.store(true, Ordering::SeqCst);
                        let _ = events.send(DeviceEvent::Ended);
                        continue;
                    }
                    if playing {
                        let position = sink.get_pos();
                        state
                            .position_ms
                            .store(position.as_millis() as u64, Ordering::SeqCst);
                        let _ = events.send(DeviceEvent::TimeUpdate(position.as_secs_f64()));
                    }
                }
            }
            Err(std_mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    sink.stop();
    tracing::info!("Audio thread stopped");
}

fn append_source(sink: &rodio::Sink, bytes: &Arc<Vec<u8>>) -> bool {
    match rodio::Decoder::new(Cursor::new(SharedBytes(bytes.clone()))) {
        Ok(source) => {
            sink.append(source);
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to decode clip");
            false
        }
    }
}

/// Rodio 设备工厂 - 每个播放会话一个新设备句柄
pub struct RodioDeviceFactory {
    http: Client,
}

impl RodioDeviceFactory {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

impl PlaybackDeviceFactory for RodioDeviceFactory {
    fn create(&self) -> Result<Arc<dyn PlaybackDevice>, DeviceError> {
        let device = RodioDevice::spawn(self.http.clone())?;
        Ok(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_bytes_as_ref() {
        let bytes = SharedBytes(Arc::new(vec![1, 2, 3]));
        assert_eq!(bytes.as_ref(), &[1, 2, 3]);
    }
}
