//! HTTP Routes
//!
//! API 路由定义
//!
//! API Endpoints:
//! - /api/set/create        POST  创建语音集（附带种子消息）
//! - /api/set/update        POST  重命名 / 切换音色
//! - /api/set/delete        POST  删除语音集（级联）
//! - /api/set/get           POST  获取语音集详情
//! - /api/set/list          GET   列出所有语音集
//! - /api/set/audio_files   POST  获取语音集导出清单
//! - /api/set/voices        GET   列出内置音色目录
//! - /api/message/create    POST  追加消息
//! - /api/message/update    POST  更新消息文本
//! - /api/message/delete    POST  删除消息（位置压缩）
//! - /api/message/get       POST  获取消息详情
//! - /api/message/list      POST  列出语音集消息
//! - /api/message/generate  POST  提交合成任务（异步，WS 通知完成）
//! - /api/message/generate_status POST 查询任务状态
//! - /api/key/store         POST  加密保存 API key
//! - /api/key/status        GET   查询 API key 是否已配置
//! - /api/audio/resolve     POST  解析消息的播放 URL
//! - /api/audio/file/{clip_id} GET 下载/流式播放音频
//! - /api/playback/open     POST  打开播放会话
//! - /api/playback/toggle   POST  播放/暂停裁决
//! - /api/playback/prefetch POST  预取播放 URL
//! - /api/playback/pause    POST  暂停
//! - /api/playback/seek     POST  跳转
//! - /api/playback/close    POST  关闭播放会话
//! - /api/playback/state    GET   播放状态快照
//! - /ws/events             WS    全局事件（CRUD + 合成任务）
//! - /ws/playback/{id}      WS    播放会话事件

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/api", api_routes())
        .route("/ws/events", get(handlers::global_websocket_handler))
        .route(
            "/ws/playback/:playback_id",
            get(handlers::playback_websocket_handler),
        )
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ping", get(handlers::ping))
        .nest("/set", set_routes())
        .nest("/message", message_routes())
        .nest("/key", key_routes())
        .nest("/audio", audio_routes())
        .nest("/playback", playback_routes())
}

/// Set 路由
fn set_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(handlers::create_set))
        .route("/update", post(handlers::update_set))
        .route("/delete", post(handlers::delete_set))
        .route("/get", post(handlers::get_set))
        .route("/list", get(handlers::list_sets))
        .route("/audio_files", post(handlers::get_set_audio_files))
        .route("/voices", get(handlers::list_voices))
}

/// Message 路由
fn message_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(handlers::create_message))
        .route("/update", post(handlers::update_message))
        .route("/delete", post(handlers::delete_message))
        .route("/get", post(handlers::get_message))
        .route("/list", post(handlers::list_messages))
        .route("/generate", post(handlers::submit_generation))
        .route("/generate_status", post(handlers::query_generation_status))
}

/// Key 路由
fn key_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/store", post(handlers::store_api_key))
        .route("/status", get(handlers::api_key_status))
}

/// Audio 路由
fn audio_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/resolve", post(handlers::resolve_audio_url))
        .route("/file/:clip_id", get(handlers::stream_clip))
}

/// Playback 路由
fn playback_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/open", post(handlers::open_playback))
        .route("/toggle", post(handlers::toggle_playback))
        .route("/prefetch", post(handlers::prefetch_playback))
        .route("/pause", post(handlers::pause_playback))
        .route("/seek", post(handlers::seek_playback))
        .route("/close", post(handlers::close_playback))
        .route("/state", get(handlers::get_playback_state))
}
