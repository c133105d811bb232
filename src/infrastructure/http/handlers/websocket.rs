//! WebSocket Handlers

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures_util::{Sink, SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::infrastructure::events::WsEvent;
use crate::infrastructure::http::state::AppState;

/// 全局 WebSocket 连接处理（CRUD 与合成任务事件）
pub async fn global_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_global_socket(socket, state))
}

/// 播放会话 WebSocket 连接处理（播放状态事件）
pub async fn playback_websocket_handler(
    ws: WebSocketUpgrade,
    Path(playback_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_playback_socket(socket, playback_id, state))
}

async fn handle_global_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut event_rx = state.event_publisher.subscribe_global();

    tracing::info!("Global WebSocket connected");

    // 事件转发任务
    let forward_task = tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(event) => {
                    if !send_event(&mut sender, &event).await {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Global WebSocket lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // 接收客户端消息（心跳/关闭）
    let receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!("Global WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Global WebSocket error");
                    break;
                }
                _ => {}
            }
        }
    });

    // 等待任一任务完成
    tokio::select! {
        _ = forward_task => {}
        _ = receive_task => {}
    }

    tracing::info!("Global WebSocket disconnected");
}

async fn handle_playback_socket(socket: WebSocket, playback_id: String, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // 验证会话存在
    if !state.playback_sessions.is_active(&playback_id) {
        tracing::warn!(
            playback_id = %playback_id,
            "WebSocket connection rejected: no such playback session"
        );
        let _ = sender.close().await;
        return;
    }

    let mut event_rx = state.event_publisher.register_playback(&playback_id);

    tracing::info!(playback_id = %playback_id, "Playback WebSocket connected");

    let playback_id_for_forward = playback_id.clone();

    // 事件转发任务
    let forward_task = tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(event) => {
                    if !send_event(&mut sender, &event).await {
                        break;
                    }
                    // 会话关闭事件后不会再有消息
                    if matches!(event, WsEvent::PlaybackClosed { .. }) {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(
                        playback_id = %playback_id_for_forward,
                        skipped,
                        "Playback WebSocket lagged"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let playback_id_for_receive = playback_id.clone();
    let receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::info!(
                        playback_id = %playback_id_for_receive,
                        "Playback WebSocket closed by client"
                    );
                    break;
                }
                Err(e) => {
                    tracing::debug!(
                        playback_id = %playback_id_for_receive,
                        error = %e,
                        "Playback WebSocket error"
                    );
                    break;
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = forward_task => {}
        _ = receive_task => {}
    }

    tracing::info!(playback_id = %playback_id, "Playback WebSocket disconnected");
}

/// 序列化并发送事件；返回 false 表示连接已不可用
async fn send_event(sender: &mut (impl Sink<Message> + Unpin), event: &WsEvent) -> bool {
    let msg = match serde_json::to_string(event) {
        Ok(json) => Message::Text(json),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize event");
            return true;
        }
    };

    sender.send(msg).await.is_ok()
}
